//! API users and their store.

use crate::error::Result;
use async_trait::async_trait;
use pet_adoption_core::model::UserId;

/// An account allowed to call the API.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Login name, unique across users
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// User store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a new user.
    ///
    /// Implementations return [`AuthError::UserAlreadyExists`](crate::AuthError::UserAlreadyExists)
    /// when the username is taken, so concurrent registrations cannot both win.
    async fn insert(&self, user: User) -> Result<User>;
}
