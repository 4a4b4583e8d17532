//! Health check endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use axum::{Json, http::StatusCode};
use pet_adoption_runtime::{HealthCheck, HealthStatus};
use serde::Serialize;

/// Liveness probe. Does NOT check dependencies.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Aggregated readiness report.
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    /// Worst status across all components
    pub status: HealthStatus,
    /// Per-component results
    pub checks: Vec<HealthCheck>,
}

impl Readiness {
    /// Aggregate component checks; no checks counts as healthy.
    #[must_use]
    pub fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let status = checks
            .iter()
            .fold(HealthStatus::Healthy, |acc, check| acc.worst(check.status));
        Self { status, checks }
    }

    /// 200 for healthy or degraded, 503 when any component is down.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Turn component checks into a readiness response.
///
/// ```text
/// GET /ready
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "checks": [{ "component": "database", "status": "healthy" }]
/// }
/// ```
#[must_use]
pub fn readiness(checks: Vec<HealthCheck>) -> (StatusCode, Json<Readiness>) {
    let report = Readiness::from_checks(checks);
    if !report.status.is_healthy() {
        tracing::warn!(status = %report.status, "Readiness check not healthy");
    }
    (report.status_code(), Json(report))
}
