//! Error types for web handlers.
//!
//! [`AppError`] bridges domain, auth and store errors to HTTP responses with
//! a `{code, message}` JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pet_adoption_auth::AuthError;
use pet_adoption_core::AdoptionError;
use pet_adoption_runtime::StoreError;
use serde::Serialize;
use std::fmt;

/// Application error type for HTTP handlers.
///
/// 5xx errors are logged with their source and answered with a generic
/// message; everything else is returned to the client as is.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the underlying cause, logged for 5xx responses.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// 400 for missing or malformed input.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "VALIDATION_ERROR")
    }

    /// 400 for a request that contradicts the current state of a record.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "CONFLICT")
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// 408 Request Timeout.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, message, "TIMEOUT")
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// 503 Service Unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message,
            "SERVICE_UNAVAILABLE",
        )
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<AdoptionError> for AppError {
    fn from(err: AdoptionError) -> Self {
        match err {
            AdoptionError::Validation(message) => Self::validation(message),
            AdoptionError::NotFound(message) => Self::not_found(message),
            AdoptionError::Conflict(message) => Self::conflict(message),
            AdoptionError::Expired(message) => Self::timeout(message),
            AdoptionError::Storage(_) => {
                Self::internal("An internal error occurred").with_source(err.into())
            },
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingFields => Self::validation(err.to_string()),
            AuthError::UserAlreadyExists => Self::conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::TokenRequired | AuthError::InvalidToken => {
                Self::unauthorized(err.to_string())
            },
            AuthError::Hashing(_) | AuthError::Storage(_) => {
                Self::internal("An internal error occurred").with_source(err.into())
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => Self::timeout(
                "Request timed out; the change may still be applied, check before retrying",
            ),
            StoreError::ShutdownInProgress
            | StoreError::ShutdownTimeout(_)
            | StoreError::ChannelClosed => {
                Self::unavailable("Service is shutting down").with_source(err.into())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let err = AppError::from(AdoptionError::required_fields());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Required fields");

        let err = AppError::from(AdoptionError::pet_not_found());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Pet not found");

        let err = AppError::from(AdoptionError::pet_already_adopted());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.message(), "Pet already adopted");
    }

    #[test]
    fn storage_errors_are_hidden() {
        let err = AppError::from(AdoptionError::storage("connection refused"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "An internal error occurred");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn auth_errors() {
        assert_eq!(
            AppError::from(AuthError::TokenRequired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).message(),
            "Invalid token"
        );
        let exists = AppError::from(AuthError::UserAlreadyExists);
        assert_eq!(exists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(exists.message(), "User already exists");
    }

    #[test]
    fn store_timeout_is_408() {
        let err = AppError::from(StoreError::Timeout);
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.code(), "TIMEOUT");
        assert!(err.message().contains("may still be applied"));

        let err = AppError::from(AdoptionError::deadline_passed());
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.message(), "Request timed out before any change was made");
    }
}
