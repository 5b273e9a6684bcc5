use anyhow::Context;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::UserId;
use crate::users_repository::{User, UsersRepository, UsersRepositoryError};

pub struct PostgresUsersRepository {
    client: Client,
}

pub struct PostgresUsersRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresUsersRepository {
    pub async fn init(config: PostgresUsersRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS users (
            user_id         SERIAL PRIMARY KEY,
            username        TEXT UNIQUE NOT NULL,
            password_hash   TEXT NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup users table")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn add_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserId, UsersRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
                 ON CONFLICT (username) DO NOTHING RETURNING user_id",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&username, &password_hash]).await?;

        rows.first()
            .ok_or_else(|| UsersRepositoryError::UsernameTaken(username.to_string()))?
            .try_get(0)
            .map_err(Into::into)
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UsersRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT user_id, username, password_hash FROM users WHERE username = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&username]).await?;

        rows.first()
            .map(|row| {
                Ok(User {
                    user_id: row.try_get("user_id")?,
                    username: row.try_get("username")?,
                    password_hash: row.try_get("password_hash")?,
                })
            })
            .transpose()
    }
}
