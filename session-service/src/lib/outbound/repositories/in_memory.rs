//! In-memory user directory, used by tests and the `memory` backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::UserError;

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    users: HashMap<UserId, User>,
    /// Index for username -> user ID lookup
    username_index: HashMap<String, UserId>,
}

/// Directory backed by process memory.
///
/// Check-and-insert happens under one write lock, which gives the same
/// create-if-absent guarantee as the database's unique constraint.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    store: RwLock<Store>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user, returning it if it existed.
    pub async fn remove(&self, id: &UserId) -> Option<User> {
        let mut store = self.store.write().await;
        let user = store.users.remove(id)?;
        store.username_index.remove(user.username.as_str());
        Some(user)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut store = self.store.write().await;

        if store.username_index.contains_key(user.username.as_str()) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        let id = UserId::new(store.last_id + 1)?;
        store.last_id = id.value();

        let created = User {
            id,
            username: user.username,
            hashed_password: user.hashed_password,
            created_at: Utc::now(),
        };

        store
            .username_index
            .insert(created.username.as_str().to_string(), id);
        store.users.insert(id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.store.read().await.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let store = self.store.read().await;

        Ok(store
            .username_index
            .get(username.as_str())
            .and_then(|id| store.users.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser::new(
            Username::new(username.to_string()).unwrap(),
            "$argon2id$test_hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let directory = InMemoryUserDirectory::new();

        let alice = directory.create(new_user("alice")).await.unwrap();
        let bob = directory.create(new_user("bob")).await.unwrap();

        assert_eq!(alice.id.value(), 1);
        assert_eq!(bob.id.value(), 2);
        assert_eq!(directory.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let directory = InMemoryUserDirectory::new();

        directory.create(new_user("alice")).await.unwrap();
        let result = directory.create(new_user("alice")).await;

        assert!(matches!(
            result,
            Err(UserError::UsernameAlreadyExists(ref name)) if name == "alice"
        ));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_same_username() {
        let directory = Arc::new(InMemoryUserDirectory::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let directory = Arc::clone(&directory);
                tokio::spawn(async move { directory.create(new_user("alice")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_id_and_username() {
        let directory = InMemoryUserDirectory::new();
        let alice = directory.create(new_user("alice")).await.unwrap();

        let by_id = directory.find_by_id(&alice.id).await.unwrap();
        let by_name = directory
            .find_by_username(&Username::new("alice".to_string()).unwrap())
            .await
            .unwrap();

        assert_eq!(by_id, Some(alice.clone()));
        assert_eq!(by_name, Some(alice));
        assert!(directory
            .find_by_id(&UserId::new(42).unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let directory = InMemoryUserDirectory::new();
        let alice = directory.create(new_user("alice")).await.unwrap();

        assert!(directory.remove(&alice.id).await.is_some());
        assert!(directory.is_empty().await);
        assert!(directory
            .find_by_username(&alice.username)
            .await
            .unwrap()
            .is_none());
    }
}
