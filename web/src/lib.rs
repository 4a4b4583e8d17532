//! Axum integration for the pet adoption backend.
//!
//! The HTTP shell around the reducers and repositories: error mapping,
//! extractors, middleware and health endpoints.
//!
//! # Request Flow
//!
//! 1. **Correlation** id attached by [`correlation_id_layer`]
//! 2. **Authentication** by [`middleware::require_bearer`] on protected routes
//! 3. **Extract** the body with [`JsonBody`]
//! 4. **Dispatch** to a repository or through the adoption `Store`
//! 5. **Map** domain errors to HTTP with [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use pet_adoption_web::{AppError, JsonBody};
//!
//! async fn create_pet(
//!     State(state): State<AppState>,
//!     JsonBody(body): JsonBody<NewPet>,
//! ) -> Result<(StatusCode, Json<Pet>), AppError> {
//!     let pet = state.pets.insert(body.into_pet(id)).await?;
//!     Ok((StatusCode::CREATED, Json(pet)))
//! }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{AuthUser, BearerToken, CorrelationId, JsonBody};
pub use middleware::{
    CORRELATION_ID_HEADER, CorrelationIdExt, CorsPolicy, correlation_id_layer, require_bearer,
};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
