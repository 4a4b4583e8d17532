//! In-memory user store.

use crate::error::{AuthError, Result};
use crate::user::{User, UserRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// User store backed by a map keyed on username.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or_default()
    }

    /// Whether no user is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .map_err(|_| AuthError::Storage("user store lock poisoned".into()))?
            .get(username)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| AuthError::Storage("user store lock poisoned".into()))?;
        if users.contains_key(&user.username) {
            return Err(AuthError::UserAlreadyExists);
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}
