//! Router for the pet adoption API.

use crate::handlers::{adopters, auth, health, pets, requests, shelters};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use pet_adoption_web::handlers::health_check;
use pet_adoption_web::{CorsPolicy, correlation_id_layer, require_bearer};
use tower_http::trace::TraceLayer;

/// Build the complete router.
///
/// # Routes
///
/// Public:
/// - `POST /api/auth/register`
/// - `POST /api/auth/login`
/// - `GET /health`, `GET /ready`
///
/// Bearer token required:
/// - `GET|POST /api/adopters`, `PUT|DELETE /api/adopters/:id`
/// - `GET|POST /api/shelters`, `PUT|DELETE /api/shelters/:id`
/// - `GET|POST /api/pets`, `PUT|DELETE /api/pets/:id`
/// - `GET|POST /api/adoption-requests`, `PUT|DELETE /api/adoption-requests/:id`
pub fn router(state: AppState, cors: &CorsPolicy) -> Router {
    let protected = Router::new()
        .route("/adopters", get(adopters::list).post(adopters::create))
        .route("/adopters/:id", put(adopters::update).delete(adopters::delete))
        .route("/shelters", get(shelters::list).post(shelters::create))
        .route("/shelters/:id", put(shelters::update).delete(shelters::delete))
        .route("/pets", get(pets::list).post(pets::create))
        .route("/pets/:id", put(pets::update).delete(pets::delete))
        .route(
            "/adoption-requests",
            get(requests::list).post(requests::create),
        )
        .route(
            "/adoption-requests/:id",
            put(requests::update).delete(requests::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_bearer,
        ));

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(health::ready))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .layer(cors.layer())
}
