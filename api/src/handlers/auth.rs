//! `/api/auth`

use super::Message;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use pet_adoption_auth::Credentials;
use pet_adoption_runtime::metrics::AuthMetrics;
use pet_adoption_web::{JsonBody, WebResult};
use serde::Serialize;

/// Body of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Bearer token
    pub token: String,
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// 400 `Required fields` or `User already exists`.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> WebResult<(StatusCode, Json<Message>)> {
    state.auth.register(&credentials).await?;
    Ok((StatusCode::CREATED, Json(Message::new("User created"))))
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// 401 `Invalid credentials`.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> WebResult<Json<TokenResponse>> {
    match state.auth.login(&credentials).await {
        Ok(token) => {
            AuthMetrics::record_login("success");
            Ok(Json(TokenResponse { token }))
        },
        Err(err) => {
            AuthMetrics::record_login("failure");
            Err(err.into())
        },
    }
}
