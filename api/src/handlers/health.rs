//! `/ready`

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use pet_adoption_runtime::HealthCheck;
use pet_adoption_web::handlers::{Readiness, readiness};

/// Readiness probe: the adoption store, plus the database when one is attached.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let mut checks = vec![state.adoption.health()];

    if let Some(pool) = &state.database {
        checks.push(match pet_adoption_postgres::ping(pool).await {
            Ok(()) => HealthCheck::healthy("database"),
            Err(e) => HealthCheck::unhealthy("database", e.to_string()),
        });
    }

    readiness(checks)
}
