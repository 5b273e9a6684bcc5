pub use in_memory_authors_repository::InMemoryAuthorsRepository;
pub use postgres_authors_repository::{PostgresAuthorsRepository, PostgresAuthorsRepositoryConfig};

use crate::api::{Author, AuthorDraft, AuthorId};

mod in_memory_authors_repository;
mod postgres_authors_repository;

#[derive(thiserror::Error, Debug)]
pub enum AuthorsRepositoryError {
    #[error("Author {0} not found")]
    NotFound(AuthorId),

    #[error("Author id {body_id} in body does not match id {path_id} in path")]
    IdMismatch { path_id: AuthorId, body_id: AuthorId },

    #[error("Failed to deserialize author: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait AuthorsRepository {
    /// Adds an author to the repository, returns the stored record with its assigned id
    async fn add_author(&self, draft: AuthorDraft) -> Result<Author, AuthorsRepositoryError>;
    /// Overwrites all mutable fields of the author with the given id.
    /// Fails with IdMismatch when author.id differs from id, with NotFound when absent.
    async fn update_author(
        &self,
        id: AuthorId,
        author: Author,
    ) -> Result<(), AuthorsRepositoryError>;
    /// Retrieves a single author from the repository
    async fn get_author(&self, id: AuthorId) -> Result<Author, AuthorsRepositoryError>;
    /// Removes the author with the given id, fails with NotFound when absent
    async fn delete_author(&self, id: AuthorId) -> Result<(), AuthorsRepositoryError>;
    /// Lists all authors in the repository, order is store-defined
    async fn list_authors(&self) -> Result<Vec<Author>, AuthorsRepositoryError>;
}
