//! Axum middleware for request tracking, authentication and CORS.
//!
//! # Flow
//!
//! 1. [`correlation_id_layer`] extracts or generates a correlation id, stores
//!    it in request extensions, opens a tracing span and echoes the id in the
//!    `X-Correlation-ID` response header
//! 2. [`require_bearer`] verifies the bearer token of protected routes and
//!    stores the caller as an [`AuthUser`] extension
//! 3. [`CorsPolicy::layer`] answers browser preflights for the allowed origins

use crate::error::AppError;
use crate::extractors::{AuthUser, BearerToken};
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::Response,
};
use pet_adoption_auth::AuthService;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// Read the correlation id stored by [`correlation_id_layer`].
pub trait CorrelationIdExt {
    /// `None` if the correlation ID middleware is not installed.
    fn try_correlation_id(&self) -> Option<Uuid>;
}

impl CorrelationIdExt for Request {
    fn try_correlation_id(&self) -> Option<Uuid> {
        self.extensions().get::<Uuid>().copied()
    }
}

/// Bearer gate for protected routes.
///
/// Install with `axum::middleware::from_fn_with_state(auth_service, require_bearer)`.
/// Requests without a valid token never reach the handler.
///
/// # Errors
///
/// 401 with `Token required` or `Invalid token`.
pub async fn require_bearer(
    State(auth): State<AuthService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let verified = BearerToken::parse(header).and_then(|BearerToken(token)| auth.authenticate(&token));
    let claims = match verified {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(
                correlation_id = ?req.try_correlation_id(),
                error = %err,
                "Rejected unauthenticated request"
            );
            return Err(err.into());
        },
    };

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
    });
    Ok(next.run(req).await)
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    /// Exact origins, e.g. `http://localhost:4200`
    pub allowed_origins: Vec<String>,
    /// Reflect any origin (development only)
    pub allow_any: bool,
}

impl CorsPolicy {
    /// Policy for a fixed list of origins.
    #[must_use]
    pub fn new<I, O>(origins: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
            allow_any: false,
        }
    }

    /// Policy that reflects every origin.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_any: true,
        }
    }

    /// Whether `origin` may make credentialed requests.
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        self.allow_any || self.allowed_origins.iter().any(|o| o == origin)
    }

    /// Build the `tower-http` layer for this policy.
    #[must_use]
    pub fn layer(&self) -> CorsLayer {
        let allow_origin = if self.allow_any {
            AllowOrigin::mirror_request()
        } else {
            let policy = self.clone();
            AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|o| policy.allows(o))
            })
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-correlation-id"),
            ])
            .expose_headers([HeaderName::from_static("x-correlation-id")])
            .allow_credentials(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, response::IntoResponse, routing::get};
    use pet_adoption_auth::mocks::InMemoryUserRepository;
    use pet_adoption_auth::{TokenConfig, TokenSigner};
    use pet_adoption_core::model::UserId;
    use pet_adoption_testing::{SequentialIdGenerator, test_clock};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn auth_service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            TokenSigner::new(TokenConfig::new("test-secret")),
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new("user")),
        )
    }

    fn protected_app() -> Router {
        async fn whoami(user: axum::Extension<AuthUser>) -> String {
            user.0.user_id.to_string()
        }

        Router::new()
            .route("/me", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                auth_service(),
                require_bearer,
            ))
    }

    #[tokio::test]
    async fn correlation_id_generated_if_missing() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present");
        assert!(Uuid::parse_str(correlation_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn correlation_id_preserved_from_request() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let request_uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, request_uuid.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let response_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(response_id, request_uuid.to_string());
    }

    #[tokio::test]
    async fn correlation_id_in_extensions() {
        async fn handler(req: Request) -> impl IntoResponse {
            if req.try_correlation_id().is_some() {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }

        let app = Router::new()
            .route("/test", get(handler))
            .layer(correlation_id_layer());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_gate_rejects_missing_token() {
        let request = Request::builder().uri("/me").body(Body::empty()).unwrap();
        let response = protected_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_gate_rejects_expired_token() {
        let issued_at = test_clock().time() - chrono::Duration::hours(2);
        let token = TokenSigner::new(TokenConfig::new("test-secret"))
            .issue(&UserId::new("user-1"), issued_at)
            .unwrap();

        let request = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = protected_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_gate_passes_caller_to_handler() {
        let token = TokenSigner::new(TokenConfig::new("test-secret"))
            .issue(&UserId::new("user-1"), test_clock().time())
            .unwrap();

        let request = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = protected_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"user-1");
    }

    #[test]
    fn cors_policy_matches_exact_origins() {
        let policy = CorsPolicy::new(["http://localhost:4200"]);
        assert!(policy.allows("http://localhost:4200"));
        assert!(!policy.allows("http://localhost:4201"));
        assert!(CorsPolicy::permissive().allows("https://anything.example"));
    }

    #[tokio::test]
    async fn cors_preflight_echoes_allowed_origin() {
        let app = Router::new()
            .route("/api/pets", get(|| async { "[]" }))
            .layer(CorsPolicy::new(["http://localhost:4200"]).layer());

        let preflight = |origin: &str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/pets")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app
            .clone()
            .oneshot(preflight("http://localhost:4200"))
            .await
            .unwrap();
        assert_eq!(
            allowed
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:4200"
        );

        let denied = app.oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(
            denied
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
