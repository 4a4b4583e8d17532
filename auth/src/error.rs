//! Error types for registration, login and token checks.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the auth workflow.
///
/// The display strings are the messages clients see.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password missing from the request.
    #[error("Required fields")]
    MissingFields,

    /// Registration for a username that is taken.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Unknown username or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected route.
    #[error("Token required")]
    TokenRequired,

    /// Bearer token malformed, forged or expired.
    #[error("Invalid token")]
    InvalidToken,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// User store failed.
    #[error("Database error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Returns `true` if the caller is at fault.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pet_adoption_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::Storage("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Hashing(_) | Self::Storage(_))
    }

    /// Returns `true` if this error should be answered with 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::TokenRequired | Self::InvalidToken
        )
    }
}

impl From<pet_adoption_core::AdoptionError> for AuthError {
    fn from(err: pet_adoption_core::AdoptionError) -> Self {
        Self::Storage(err.to_string())
    }
}
