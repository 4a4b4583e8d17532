//! `/api/shelters`

use super::Message;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pet_adoption_core::model::{NewShelter, Shelter, ShelterId, ShelterPatch};
use pet_adoption_web::{AppError, JsonBody, WebResult};

/// `GET /api/shelters`
pub async fn list(State(state): State<AppState>) -> WebResult<Json<Vec<Shelter>>> {
    Ok(Json(state.repos.shelters.list().await?))
}

/// `POST /api/shelters`
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewShelter>,
) -> WebResult<(StatusCode, Json<Shelter>)> {
    let shelter = body.into_shelter(ShelterId::new(state.next_id()));
    let shelter = state.repos.shelters.insert(shelter).await?;
    tracing::info!(shelter_id = %shelter.id, "Shelter created");
    Ok((StatusCode::CREATED, Json(shelter)))
}

/// `PUT /api/shelters/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ShelterPatch>,
) -> WebResult<Json<Shelter>> {
    state
        .repos
        .shelters
        .update(&ShelterId::new(id), &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Shelter not found"))
}

/// `DELETE /api/shelters/:id`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<Message>> {
    if !state.repos.shelters.delete(&ShelterId::new(id)).await? {
        return Err(AppError::not_found("Shelter not found"));
    }
    Ok(Json(Message::new("Shelter deleted")))
}
