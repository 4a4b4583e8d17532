//! Register, login and token checks.

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::token::{Claims, TokenSigner};
use crate::user::{User, UserRepository};
use pet_adoption_core::environment::{Clock, IdGenerator};
use pet_adoption_core::model::UserId;
use serde::Deserialize;
use std::sync::Arc;

/// Username and password as posted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
    /// Plain-text password
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Credentials with both fields set
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    fn present(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().map(str::trim)?;
        let password = self.password.as_deref()?;
        (!username.is_empty() && !password.is_empty()).then_some((username, password))
    }
}

/// Auth workflow over an injected user store, signer and clock.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    signer: TokenSigner,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AuthService {
    /// Create a new auth service
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        signer: TokenSigner,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            users,
            signer,
            clock,
            ids,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingFields`] if username or password is empty
    /// - [`AuthError::UserAlreadyExists`] if the username is taken
    /// - [`AuthError::Hashing`] / [`AuthError::Storage`] on system faults
    #[tracing::instrument(skip_all, fields(username = credentials.username.as_deref().unwrap_or_default()))]
    pub async fn register(&self, credentials: &Credentials) -> Result<User> {
        let (username, password) = credentials.present().ok_or(AuthError::MissingFields)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password.to_string()).await?;
        let user = self
            .users
            .insert(User {
                id: UserId::new(self.ids.next_id()),
                username: username.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for missing fields, an
    /// unknown username or a wrong password.
    #[tracing::instrument(skip_all, fields(username = credentials.username.as_deref().unwrap_or_default()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let (username, password) = credentials.present().ok_or(AuthError::InvalidCredentials)?;

        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!("Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.signer.issue(&user.id, self.clock.now())
    }

    /// Verify a bearer token against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if verification fails.
    pub fn authenticate(&self, token: &str) -> Result<Claims> {
        self.signer.verify(token, self.clock.now())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::mocks::InMemoryUserRepository;
    use pet_adoption_testing::{SequentialIdGenerator, test_clock};

    fn service() -> (AuthService, InMemoryUserRepository) {
        let users = InMemoryUserRepository::new();
        let service = AuthService::new(
            Arc::new(users.clone()),
            TokenSigner::new(TokenConfig::new("test-secret")),
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new("user")),
        );
        (service, users)
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, users) = service();
        let user = service
            .register(&Credentials::new("alice", "pw"))
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new("user-1"));
        assert_ne!(user.password_hash, "pw");
        assert_eq!(users.len(), 1);

        let token = service.login(&Credentials::new("alice", "pw")).await.unwrap();
        let claims = service.authenticate(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let (service, users) = service();
        for creds in [
            Credentials::default(),
            Credentials::new("", "pw"),
            Credentials::new("   ", "pw"),
            Credentials::new("bob", ""),
        ] {
            assert_eq!(
                service.register(&creds).await.unwrap_err(),
                AuthError::MissingFields
            );
        }
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let (service, _) = service();
        service.register(&Credentials::new("alice", "a")).await.unwrap();
        assert_eq!(
            service
                .register(&Credentials::new("alice", "b"))
                .await
                .unwrap_err(),
            AuthError::UserAlreadyExists
        );
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (service, _) = service();
        service.register(&Credentials::new("alice", "pw")).await.unwrap();

        for creds in [
            Credentials::new("alice", "nope"),
            Credentials::new("mallory", "pw"),
            Credentials::default(),
        ] {
            assert_eq!(
                service.login(&creds).await.unwrap_err(),
                AuthError::InvalidCredentials
            );
        }
    }
}
