//! `/api/adoption-requests`
//!
//! Create and update are commands on the adoption store; the handler waits
//! for the outcome of its own command.

use super::Message;
use crate::adoption::AdoptionAction;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pet_adoption_core::model::{AdoptionRequest, AdoptionRequestId, AdoptionRequestPatch};
use pet_adoption_web::{AppError, CorrelationId, JsonBody, WebResult};
use serde::Deserialize;
use tokio::time::Instant;
use uuid::Uuid;

/// Body of `POST /api/adoption-requests`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestBody {
    /// Adopter reference
    #[serde(default)]
    pub adopter_id: Option<String>,
    /// Pet reference
    #[serde(default)]
    pub pet_id: Option<String>,
    /// Free-text comments
    #[serde(default)]
    pub comments: Option<String>,
}

/// `GET /api/adoption-requests`
pub async fn list(State(state): State<AppState>) -> WebResult<Json<Vec<AdoptionRequest>>> {
    Ok(Json(state.repos.requests.list().await?))
}

/// `POST /api/adoption-requests`
///
/// ```text
/// { "adopterId": "a1", "petId": "p1", "comments": "..." }
/// ```
///
/// # Errors
///
/// - 400 `Required fields` if `adopterId` or `petId` is missing or blank
/// - 404 `Pet not found`
/// - 400 `Pet already adopted`
/// - 408 if the workflow does not answer within the request timeout. If the
///   pet lookup alone used up the timeout nothing was written; otherwise the
///   request may still be stored, so clients should list before retrying
pub async fn create(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    JsonBody(body): JsonBody<SubmitRequestBody>,
) -> WebResult<(StatusCode, Json<AdoptionRequest>)> {
    let command_id = Uuid::new_v4();
    tracing::debug!(%correlation_id, %command_id, "Submitting adoption request");

    let action = AdoptionAction::SubmitRequest {
        command_id,
        adopter_id: body.adopter_id,
        pet_id: body.pet_id,
        comments: body.comments,
        deadline: Instant::now() + state.request_timeout,
    };

    match dispatch(&state, action, command_id).await? {
        AdoptionAction::RequestCreated { request, .. } => Ok((StatusCode::CREATED, Json(request))),
        AdoptionAction::RequestFailed { error, .. } => Err(error.into()),
        _ => Err(AppError::internal("Unexpected action received")),
    }
}

/// `PUT /api/adoption-requests/:id`
///
/// Merges `comments`; a `status` change approves or rejects the request.
pub async fn update(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<AdoptionRequestPatch>,
) -> WebResult<Json<AdoptionRequest>> {
    let command_id = Uuid::new_v4();
    tracing::debug!(%correlation_id, %command_id, request_id = %id, "Updating adoption request");

    let action = AdoptionAction::DecideRequest {
        command_id,
        request_id: AdoptionRequestId::new(id),
        patch,
        deadline: Instant::now() + state.request_timeout,
    };

    match dispatch(&state, action, command_id).await? {
        AdoptionAction::RequestUpdated { request, .. } => Ok(Json(request)),
        AdoptionAction::RequestFailed { error, .. } => Err(error.into()),
        _ => Err(AppError::internal("Unexpected action received")),
    }
}

/// `DELETE /api/adoption-requests/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> WebResult<Json<Message>> {
    if !state
        .repos
        .requests
        .delete(&AdoptionRequestId::new(id))
        .await?
    {
        return Err(AppError::not_found("Adoption request not found"));
    }
    Ok(Json(Message::new("Adoption request deleted")))
}

async fn dispatch(
    state: &AppState,
    action: AdoptionAction,
    command_id: Uuid,
) -> WebResult<AdoptionAction> {
    Ok(state
        .adoption
        .send_and_wait_for(
            action,
            move |a| a.is_outcome_for(command_id),
            state.request_timeout,
        )
        .await?)
}
