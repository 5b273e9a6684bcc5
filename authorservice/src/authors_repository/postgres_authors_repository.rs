use anyhow::Context;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{Author, AuthorDraft, AuthorId};
use crate::authors_repository::{AuthorsRepository, AuthorsRepositoryError};

pub struct PostgresAuthorsRepository {
    client: Client,
}

pub struct PostgresAuthorsRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresAuthorsRepository {
    pub async fn init(config: PostgresAuthorsRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!("Postgres connection_str: {}", connection_str);
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
        CREATE TABLE IF NOT EXISTS authors (
            author_id       SERIAL PRIMARY KEY,
            author_name     TEXT,
            num_of_books    INT,
            author_rating   TEXT
            )
        ",
            )
            .await
            .context("Failed to setup authors table")?;
        Ok(Self { client })
    }
}

fn author_from_row(row: &tokio_postgres::Row) -> Result<Author, AuthorsRepositoryError> {
    Ok(Author {
        id: row.try_get("author_id")?,
        name: row.try_get("author_name")?,
        num_of_books: row.try_get("num_of_books")?,
        rating: row.try_get("author_rating")?,
    })
}

#[async_trait::async_trait]
impl AuthorsRepository for PostgresAuthorsRepository {
    async fn add_author(&self, draft: AuthorDraft) -> Result<Author, AuthorsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO authors (author_name, num_of_books, author_rating) \
                 VALUES ($1, $2, $3) RETURNING author_id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&draft.name, &draft.num_of_books, &draft.rating])
            .await?;

        let id: AuthorId = rows
            .first()
            .ok_or_else(|| AuthorsRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(draft.with_id(id))
    }

    async fn update_author(
        &self,
        id: AuthorId,
        author: Author,
    ) -> Result<(), AuthorsRepositoryError> {
        if author.id != id {
            return Err(AuthorsRepositoryError::IdMismatch {
                path_id: id,
                body_id: author.id,
            });
        }

        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE authors SET author_name = ($1), num_of_books = ($2), \
                 author_rating = ($3) WHERE author_id = ($4) RETURNING author_id",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[&author.name, &author.num_of_books, &author.rating, &id],
            )
            .await?;

        if rows.is_empty() {
            Err(AuthorsRepositoryError::NotFound(id))
        } else {
            Ok(())
        }
    }

    async fn get_author(&self, id: AuthorId) -> Result<Author, AuthorsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT author_id, author_name, num_of_books, author_rating \
                 FROM authors WHERE author_id = ($1)",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&id]).await?;

        author_from_row(rows.first().ok_or(AuthorsRepositoryError::NotFound(id))?)
    }

    async fn delete_author(&self, id: AuthorId) -> Result<(), AuthorsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM authors WHERE author_id = ($1) RETURNING author_id")
            .await?;

        let rows = self.client.query(&stmt, &[&id]).await?;

        if rows.is_empty() {
            Err(AuthorsRepositoryError::NotFound(id))
        } else {
            Ok(())
        }
    }

    async fn list_authors(&self) -> Result<Vec<Author>, AuthorsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT author_id, author_name, num_of_books, author_rating \
                 FROM authors ORDER BY author_id",
            )
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter().map(author_from_row).collect()
    }
}
