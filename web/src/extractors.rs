//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: request correlation id, set by the middleware or
//!   generated on the spot
//! - [`BearerToken`]: raw token from the `Authorization` header
//! - [`AuthUser`]: verified caller identity for protected routes
//! - [`JsonBody`]: JSON body whose rejections use the [`AppError`] format

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{header, request::Parts},
};
use pet_adoption_auth::{AuthError, AuthService};
use pet_adoption_core::model::UserId;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::middleware::CORRELATION_ID_HEADER;

/// Correlation ID for request tracing.
///
/// Prefers the id stored by [`correlation_id_layer`](crate::middleware::correlation_id_layer),
/// then a valid `X-Correlation-ID` header, otherwise a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Bearer token from `Authorization: Bearer <token>`.
///
/// Rejects with `Token required` when the header or token is missing, and
/// with `Invalid token` for any other scheme.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Parse an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// See the type-level docs.
    pub fn parse(value: Option<&str>) -> Result<Self, AuthError> {
        let value = value.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Err(AuthError::TokenRequired);
        }

        let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::InvalidToken);
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::TokenRequired);
        }
        Ok(Self(token.to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        Ok(Self::parse(header)?)
    }
}

/// Authenticated caller.
///
/// Reuses an identity already verified by
/// [`require_bearer`](crate::middleware::require_bearer); otherwise verifies
/// the bearer token with the [`AuthService`] in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Subject of the verified token
    pub user_id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<Self>() {
            return Ok(user.clone());
        }

        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let claims = AuthService::from_ref(state).authenticate(&token)?;
        Ok(Self {
            user_id: claims.user_id,
        })
    }
}

/// JSON request body.
///
/// Same as [`axum::Json`], but malformed bodies are answered with a
/// `BAD_REQUEST` [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(json_rejection(&rejection))
            },
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("Expected a JSON request body")
        },
        _ => AppError::bad_request("Malformed JSON body"),
    }
}
