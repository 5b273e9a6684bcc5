pub use in_memory_users_repository::InMemoryUsersRepository;
pub use postgres_users_repository::{PostgresUsersRepository, PostgresUsersRepositoryConfig};

use crate::api::UserId;

mod in_memory_users_repository;
mod postgres_users_repository;

/// A login user as stored, the password is kept only as an Argon2 PHC string.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
}

#[derive(thiserror::Error, Debug)]
pub enum UsersRepositoryError {
    #[error("Username {0} is already taken")]
    UsernameTaken(String),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait UsersRepository {
    /// Adds a user with the given password hash, returns the assigned id.
    /// Fails with UsernameTaken when the username already exists.
    async fn add_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserId, UsersRepositoryError>;
    /// Looks a user up by username, None when absent
    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UsersRepositoryError>;
}
