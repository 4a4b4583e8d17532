//! `/api/pets`
//!
//! Field edits merge like every other resource. A `status` in the body is a
//! lifecycle move: it is checked with `PetStatus::transition_to` and written
//! with a compare-and-set on the status it was checked against.

use super::Message;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pet_adoption_core::AdoptionError;
use pet_adoption_core::model::{NewPet, Pet, PetId, PetPatch};
use pet_adoption_runtime::metrics::AdoptionMetrics;
use pet_adoption_web::{AppError, JsonBody, WebResult};

/// `GET /api/pets`
pub async fn list(State(state): State<AppState>) -> WebResult<Json<Vec<Pet>>> {
    Ok(Json(state.repos.pets.list().await?))
}

/// `POST /api/pets`
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPet>,
) -> WebResult<(StatusCode, Json<Pet>)> {
    let pet = body.into_pet(PetId::new(state.next_id()));
    let pet = state.repos.pets.insert(pet).await?;
    tracing::info!(pet_id = %pet.id, status = %pet.status, "Pet created");
    Ok((StatusCode::CREATED, Json(pet)))
}

/// `PUT /api/pets/:id`
///
/// # Errors
///
/// 404 for an unknown pet, 400 for an illegal status change or a status that
/// moved underneath this request.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<PetPatch>,
) -> WebResult<Json<Pet>> {
    let id = PetId::new(id);
    let current = state
        .repos
        .pets
        .get(&id)
        .await?
        .ok_or_else(AdoptionError::pet_not_found)?;

    if let Some(requested) = patch.status.filter(|s| *s != current.status) {
        let next = current.status.transition_to(requested)?;
        if !state
            .repos
            .pets
            .compare_and_set_status(&id, current.status, next)
            .await?
        {
            AdoptionMetrics::record_cas_conflict();
            return Err(AppError::conflict("Pet status changed concurrently"));
        }
        AdoptionMetrics::record_transition(current.status, next);
        tracing::info!(pet_id = %id, from = %current.status, to = %next, "Pet status changed");
    }

    state
        .repos
        .pets
        .update(&id, &patch.without_status())
        .await?
        .map(Json)
        .ok_or_else(|| AdoptionError::pet_not_found().into())
}

/// `DELETE /api/pets/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> WebResult<Json<Message>> {
    if !state.repos.pets.delete(&PetId::new(id)).await? {
        return Err(AdoptionError::pet_not_found().into());
    }
    Ok(Json(Message::new("Pet deleted")))
}
