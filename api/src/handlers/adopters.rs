//! `/api/adopters`

use super::Message;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pet_adoption_core::model::{Adopter, AdopterId, AdopterPatch, NewAdopter};
use pet_adoption_web::{AppError, AuthUser, JsonBody, WebResult};

/// `GET /api/adopters`
pub async fn list(State(state): State<AppState>) -> WebResult<Json<Vec<Adopter>>> {
    Ok(Json(state.repos.adopters.list().await?))
}

/// `POST /api/adopters`
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<NewAdopter>,
) -> WebResult<(StatusCode, Json<Adopter>)> {
    let adopter = body.into_adopter(AdopterId::new(state.next_id()));
    let adopter = state.repos.adopters.insert(adopter).await?;
    tracing::info!(adopter_id = %adopter.id, user_id = %user.user_id, "Adopter created");
    Ok((StatusCode::CREATED, Json(adopter)))
}

/// `PUT /api/adopters/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<AdopterPatch>,
) -> WebResult<Json<Adopter>> {
    state
        .repos
        .adopters
        .update(&AdopterId::new(id), &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Adopter not found"))
}

/// `DELETE /api/adopters/:id`
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> WebResult<Json<Message>> {
    let id = AdopterId::new(id);
    if !state.repos.adopters.delete(&id).await? {
        return Err(AppError::not_found("Adopter not found"));
    }
    tracing::info!(adopter_id = %id, user_id = %user.user_id, "Adopter deleted");
    Ok(Json(Message::new("Adopter deleted")))
}
