use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::UserId;
use crate::users_repository::{User, UsersRepository, UsersRepositoryError};

pub struct InMemoryUsersRepository {
    user_sequence_generator: AtomicI32,
    users: parking_lot::RwLock<HashMap<String, User>>,
}

impl Default for InMemoryUsersRepository {
    fn default() -> Self {
        Self {
            user_sequence_generator: AtomicI32::new(1),
            users: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn add_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserId, UsersRepositoryError> {
        let mut locked_users = self.users.write();
        if locked_users.contains_key(username) {
            return Err(UsersRepositoryError::UsernameTaken(username.to_string()));
        }
        let user_id = self.user_sequence_generator.fetch_add(1, Ordering::Relaxed);
        locked_users.insert(
            username.to_string(),
            User {
                user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user_id)
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UsersRepositoryError> {
        Ok(self.users.read().get(username).cloned())
    }
}

#[cfg(test)]
mod in_memory_users_repository_tests {
    use crate::users_repository::{
        InMemoryUsersRepository, UsersRepository, UsersRepositoryError,
    };

    #[tokio::test]
    /// Tests that add_user stores the user and get_user_by_username finds it
    async fn test_add_user_and_get_it() {
        let repo = InMemoryUsersRepository::default();

        let absent = repo
            .get_user_by_username("nobody")
            .await
            .expect("Failed to get user");
        assert_eq!(absent, None);

        let user_id = repo
            .add_user("alice", "$argon2id$fakehash")
            .await
            .expect("Failed to add user");

        let user = repo
            .get_user_by_username("alice")
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "$argon2id$fakehash");
    }

    #[tokio::test]
    /// Tests that a duplicate username is rejected
    async fn test_duplicate_username_fails() {
        let repo = InMemoryUsersRepository::default();

        repo.add_user("alice", "hash1")
            .await
            .expect("Failed to add user");

        let result = repo.add_user("alice", "hash2").await;
        assert!(matches!(
            result,
            Err(UsersRepositoryError::UsernameTaken(..))
        ));
    }
}
