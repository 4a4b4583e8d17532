//! HTTP API integration tests.
//!
//! Drives the full router (auth gate, correlation ids, handlers and the
//! adoption store) over in-memory stores with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use pet_adoption_api::{AppState, Repositories, router};
use pet_adoption_auth::TokenConfig;
use pet_adoption_testing::{InMemoryPetRepository, SequentialIdGenerator, test_clock};
use pet_adoption_web::{CORRELATION_ID_HEADER, CorsPolicy};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app() -> Router {
    app_with(Repositories::in_memory(), Duration::from_secs(5))
}

fn app_with(repos: Repositories, request_timeout: Duration) -> Router {
    let state = AppState::new(
        repos,
        TokenConfig::new("integration-secret"),
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::new("id")),
        request_timeout,
    );
    router(state, &CorsPolicy::permissive())
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

/// Register and log in a user, returning the bearer token.
async fn login(app: &Router) -> String {
    let credentials = json!({ "username": "maria", "password": "s3cret" });
    let (status, _) = call(app, Method::POST, "/api/auth/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_pet(app: &Router, token: &str, status: &str) -> String {
    let (code, body) = call(
        app,
        Method::POST,
        "/api/pets",
        Some(token),
        Some(json!({ "name": "Firulais", "species": "dog", "status": status })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
    body["_id"].as_str().unwrap().to_string()
}

async fn pet_status(app: &Router, token: &str, pet_id: &str) -> String {
    let (_, pets) = call(app, Method::GET, "/api/pets", Some(token), None).await;
    pets.as_array()
        .unwrap()
        .iter()
        .find(|p| p["_id"] == pet_id)
        .map(|p| p["status"].as_str().unwrap().to_string())
        .unwrap()
}

async fn submit(app: &Router, token: &str, pet_id: &str) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/api/adoption-requests",
        Some(token),
        Some(json!({ "adopterId": "a1", "petId": pet_id, "comments": "Big yard" })),
    )
    .await
}

#[tokio::test]
async fn register_rejects_duplicates_and_login_checks_password() {
    let app = app();
    login(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "maria", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "maria", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn register_requires_both_fields() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "maria" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Required fields");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/api/pets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token required");

    let (status, body) = call(&app, Method::GET, "/api/pets", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let token = login(&app).await;
    let (status, body) = call(&app, Method::GET, "/api/pets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn request_for_available_pet_moves_it_in_process() {
    let app = app();
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "AVAILABLE").await;

    let (status, request) = submit(&app, &token, &pet_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["petId"], pet_id.as_str());
    assert_eq!(request["adopterId"], "a1");
    assert_eq!(request["status"], "PENDING");
    assert_eq!(request["comments"], "Big yard");
    assert_eq!(request["requestDate"], "2025-01-01T00:00:00Z");

    assert_eq!(pet_status(&app, &token, &pet_id).await, "IN_PROCESS");
}

#[tokio::test]
async fn request_for_adopted_pet_is_refused() {
    let app = app();
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "ADOPTED").await;

    let (status, body) = submit(&app, &token, &pet_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Pet already adopted");

    let (_, requests) = call(&app, Method::GET, "/api/adoption-requests", Some(&token), None).await;
    assert_eq!(requests, json!([]));
    assert_eq!(pet_status(&app, &token, &pet_id).await, "ADOPTED");
}

#[tokio::test]
async fn request_validation_and_missing_pet() {
    let app = app();
    let token = login(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/adoption-requests",
        Some(&token),
        Some(json!({ "petId": "p1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Required fields");

    let (status, body) = submit(&app, &token, "missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Pet not found");
}

#[tokio::test]
async fn approving_a_request_adopts_the_pet() {
    let app = app();
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "AVAILABLE").await;
    let (_, request) = submit(&app, &token, &pet_id).await;
    let uri = format!("/api/adoption-requests/{}", request["_id"].as_str().unwrap());

    let (status, body) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "status": "APPROVED" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");
    assert_eq!(body["comments"], "Big yard");
    assert_eq!(pet_status(&app, &token, &pet_id).await, "ADOPTED");

    let (status, _) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "status": "REJECTED" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejecting_the_last_request_releases_the_pet() {
    let app = app();
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "AVAILABLE").await;
    let (_, first) = submit(&app, &token, &pet_id).await;
    let (_, second) = submit(&app, &token, &pet_id).await;

    let reject = |request: &Value| {
        format!("/api/adoption-requests/{}", request["_id"].as_str().unwrap())
    };

    let (status, _) = call(&app, Method::PUT, &reject(&first), Some(&token), Some(json!({ "status": "REJECTED" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet_status(&app, &token, &pet_id).await, "IN_PROCESS");

    let (status, _) = call(&app, Method::PUT, &reject(&second), Some(&token), Some(json!({ "status": "REJECTED" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet_status(&app, &token, &pet_id).await, "AVAILABLE");
}

#[tokio::test]
async fn timed_out_submission_changes_nothing() {
    let repos = Repositories {
        pets: Arc::new(InMemoryPetRepository::new().with_read_delay(Duration::from_millis(150))),
        ..Repositories::in_memory()
    };
    let app = app_with(repos, Duration::from_millis(30));
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "AVAILABLE").await;

    let (status, body) = submit(&app, &token, &pet_id).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["code"], "TIMEOUT");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let (_, requests) = call(&app, Method::GET, "/api/adoption-requests", Some(&token), None).await;
    assert_eq!(requests, json!([]));
    assert_eq!(pet_status(&app, &token, &pet_id).await, "AVAILABLE");
}

#[tokio::test]
async fn adoption_request_delete() {
    let app = app();
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "AVAILABLE").await;
    let (_, request) = submit(&app, &token, &pet_id).await;
    let uri = format!("/api/adoption-requests/{}", request["_id"].as_str().unwrap());

    let (status, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Adoption request deleted");

    let (status, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Adoption request not found");
}

#[tokio::test]
async fn adopter_crud() {
    let app = app();
    let token = login(&app).await;

    let (status, adopter) = call(
        &app,
        Method::POST,
        "/api/adopters",
        Some(&token),
        Some(json!({ "fullName": "Ana", "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/adopters/{}", adopter["_id"].as_str().unwrap());

    let (status, updated) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "phone": "555-0101" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["fullName"], "Ana");
    assert_eq!(updated["phone"], "555-0101");

    let (status, body) = call(&app, Method::PUT, "/api/adopters/nope", Some(&token), Some(json!({ "phone": "1" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Adopter not found");

    let (status, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Adopter deleted");

    let (_, list) = call(&app, Method::GET, "/api/adopters", Some(&token), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn shelter_crud() {
    let app = app();
    let token = login(&app).await;

    let (status, shelter) = call(
        &app,
        Method::POST,
        "/api/shelters",
        Some(&token),
        Some(json!({ "name": "Happy Tails", "address": "Main St 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/shelters/{}", shelter["_id"].as_str().unwrap());

    let (status, updated) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "name": "Happier Tails" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Happier Tails");
    assert_eq!(updated["address"], "Main St 1");

    let (status, body) = call(&app, Method::DELETE, "/api/shelters/nope", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Shelter not found");
}

#[tokio::test]
async fn pet_status_edits_follow_the_lifecycle() {
    let app = app();
    let token = login(&app).await;
    let pet_id = create_pet(&app, &token, "AVAILABLE").await;
    let uri = format!("/api/pets/{pet_id}");

    let (status, _) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "status": "ADOPTED" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(pet_status(&app, &token, &pet_id).await, "AVAILABLE");

    let (status, pet) = call(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "status": "IN_PROCESS", "ageYears": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet["status"], "IN_PROCESS");
    assert_eq!(pet["ageYears"], 4);
    assert_eq!(pet["name"], "Firulais");

    let (status, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Pet deleted");

    let (status, body) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "ageYears": 5 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Pet not found");
}

#[tokio::test]
async fn pet_age_is_accepted_and_returned_as_age_years() {
    let app = app();
    let token = login(&app).await;

    let (status, pet) = call(
        &app,
        Method::POST,
        "/api/pets",
        Some(&token),
        Some(json!({ "name": "Rex", "ageYears": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pet["ageYears"], 2);

    let (_, pets) = call(&app, Method::GET, "/api/pets", Some(&token), None).await;
    let listed = pets.as_array().unwrap().iter().find(|p| p["_id"] == pet["_id"]).unwrap();
    assert_eq!(listed["ageYears"], 2);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let token = login(&app).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/pets")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_readiness() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, body) = call(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let app = app();
    let id = "6f0c1b55-7c1c-4b7e-9d1b-0a6b8d7a2f11";

    let request = Request::builder()
        .uri("/health")
        .header(CORRELATION_ID_HEADER, id)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers().get(CORRELATION_ID_HEADER).unwrap(), id);
}
