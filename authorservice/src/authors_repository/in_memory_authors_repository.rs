use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{Author, AuthorDraft, AuthorId};
use crate::authors_repository::{AuthorsRepository, AuthorsRepositoryError};

pub struct InMemoryAuthorsRepository {
    author_sequence_generator: AtomicI32,
    authors: parking_lot::RwLock<HashMap<AuthorId, Author>>,
}

impl Default for InMemoryAuthorsRepository {
    fn default() -> Self {
        Self {
            // Ids are assigned from 1, matching the SERIAL column of the postgres backend
            author_sequence_generator: AtomicI32::new(1),
            authors: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl AuthorsRepository for InMemoryAuthorsRepository {
    async fn add_author(&self, draft: AuthorDraft) -> Result<Author, AuthorsRepositoryError> {
        let id = self.author_sequence_generator.fetch_add(1, Ordering::Relaxed);
        let author = draft.with_id(id);
        self.authors.write().insert(id, author.clone());
        Ok(author)
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
        let mut locked_authors = self.authors.write();
        match locked_authors.get_mut(&id) {
            Some(existing) => {
                *existing = author;
                Ok(())
            }
            None => Err(AuthorsRepositoryError::NotFound(id)),
        }
    }

    async fn get_author(&self, id: AuthorId) -> Result<Author, AuthorsRepositoryError> {
        self.authors
            .read()
            .get(&id)
            .cloned()
            .ok_or(AuthorsRepositoryError::NotFound(id))
    }

    async fn delete_author(&self, id: AuthorId) -> Result<(), AuthorsRepositoryError> {
        self.authors
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(AuthorsRepositoryError::NotFound(id))
    }

    async fn list_authors(&self) -> Result<Vec<Author>, AuthorsRepositoryError> {
        Ok(self.authors.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod in_memory_authors_repository_tests {
    use crate::api::{Author, AuthorDraft};
    use crate::authors_repository::{
        AuthorsRepository, AuthorsRepositoryError, InMemoryAuthorsRepository,
    };

    fn sample_draft() -> AuthorDraft {
        AuthorDraft {
            name: Some("Asimov".to_string()),
            num_of_books: Some(500),
            rating: Some("A".to_string()),
        }
    }

    #[tokio::test]
    /// Tests that add_author assigns ids starting from 1 and get_author returns the stored record
    async fn test_add_author_and_get_it() {
        let repo = InMemoryAuthorsRepository::default();

        let not_existing_author_id = 20000;
        let author_not_found = repo.get_author(not_existing_author_id).await;
        assert!(matches!(
            author_not_found,
            Err(AuthorsRepositoryError::NotFound(..))
        ));

        let draft = sample_draft();
        let author = repo
            .add_author(draft.clone())
            .await
            .expect("Failed to add author");
        assert_eq!(author.id, 1);
        assert_eq!(author, draft.with_id(author.id));

        let fetched = repo.get_author(author.id).await.expect("Failed to get author");
        assert_eq!(fetched, author);
    }

    #[tokio::test]
    /// Tests that list_authors grows with every added author
    async fn test_add_authors_and_list_them() {
        let repo = InMemoryAuthorsRepository::default();

        let list = repo.list_authors().await.expect("Failed to list authors");
        assert_eq!(list, vec![]);

        let author1 = repo
            .add_author(sample_draft())
            .await
            .expect("Failed to add author");

        let list = repo.list_authors().await.expect("Failed to list authors");
        assert_eq!(list, vec![author1.clone()]);

        let author2 = repo
            .add_author(AuthorDraft {
                name: Some("Lem".to_string()),
                ..sample_draft()
            })
            .await
            .expect("Failed to add author");

        let mut list = repo.list_authors().await.expect("Failed to list authors");
        list.sort_by_key(|author| author.id);
        assert_eq!(list, vec![author1, author2]);
    }

    #[tokio::test]
    /// Tests that update_author overwrites every mutable field
    async fn test_add_author_update_and_get_it() {
        let repo = InMemoryAuthorsRepository::default();

        let author = repo
            .add_author(sample_draft())
            .await
            .expect("Failed to add author");

        let updated = Author {
            id: author.id,
            name: Some("Lem".to_string()),
            num_of_books: None,
            rating: Some("B".to_string()),
        };
        repo.update_author(author.id, updated.clone())
            .await
            .expect("Failed to update author");

        assert_eq!(repo.get_author(author.id).await.unwrap(), updated);
    }

    #[tokio::test]
    /// Tests that update_author rejects a body id differing from the path id,
    /// both for existing and absent records
    async fn test_update_author_with_mismatched_id_fails() {
        let repo = InMemoryAuthorsRepository::default();

        let mismatched = sample_draft().with_id(2);
        let result = repo.update_author(1, mismatched.clone()).await;
        assert!(matches!(
            result,
            Err(AuthorsRepositoryError::IdMismatch {
                path_id: 1,
                body_id: 2
            })
        ));

        let author = repo
            .add_author(sample_draft())
            .await
            .expect("Failed to add author");
        assert_eq!(author.id, 1);

        let result = repo.update_author(author.id, mismatched).await;
        assert!(matches!(
            result,
            Err(AuthorsRepositoryError::IdMismatch { .. })
        ));
    }

    #[tokio::test]
    /// Tests that update_author of an absent record yields NotFound
    async fn test_update_absent_author_fails() {
        let repo = InMemoryAuthorsRepository::default();

        let result = repo.update_author(2000, sample_draft().with_id(2000)).await;
        assert!(matches!(result, Err(AuthorsRepositoryError::NotFound(2000))));
    }

    #[tokio::test]
    /// Tests that delete_author removes the record and fails on absent ids
    async fn test_delete_author() {
        let repo = InMemoryAuthorsRepository::default();

        let result = repo.delete_author(2000).await;
        assert!(matches!(result, Err(AuthorsRepositoryError::NotFound(2000))));

        let author = repo
            .add_author(sample_draft())
            .await
            .expect("Failed to add author");

        repo.delete_author(author.id)
            .await
            .expect("Failed to delete author");

        let result = repo.get_author(author.id).await;
        assert!(matches!(result, Err(AuthorsRepositoryError::NotFound(..))));
    }
}
