//! Reducer for the adoption workflow.

use super::state::Command;
use super::{AdoptionAction, AdoptionEnvironment, AdoptionState};
use pet_adoption_core::AdoptionError;
use pet_adoption_core::model::{AdopterId, PetId};
use pet_adoption_core::{effect::Effect, reducer::Reducer};
use pet_adoption_runtime::metrics::AdoptionMetrics;
use smallvec::{SmallVec, smallvec};

/// Validates commands and turns them into storage effects.
///
/// Validation failures never reach storage: they are answered with an
/// immediate `RequestFailed` so waiting handlers see them on the action
/// broadcast.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdoptionReducer;

impl AdoptionReducer {
    /// Create a new reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Trimmed, non-empty reference.
fn required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

impl Reducer for AdoptionReducer {
    type State = AdoptionState;
    type Action = AdoptionAction;
    type Environment = AdoptionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AdoptionAction::SubmitRequest {
                command_id,
                adopter_id,
                pet_id,
                comments,
                deadline,
            } => {
                let (Some(adopter_id), Some(pet_id)) =
                    (required(adopter_id.as_deref()), required(pet_id.as_deref()))
                else {
                    return smallvec![Effect::send(AdoptionAction::RequestFailed {
                        command_id,
                        error: AdoptionError::required_fields(),
                    })];
                };

                state.start(command_id, Command::Submit);
                let env = env.clone();
                smallvec![Effect::future(async move {
                    let outcome = env
                        .create_request(
                            AdopterId::new(adopter_id),
                            PetId::new(pet_id),
                            comments,
                            deadline,
                        )
                        .await;
                    Some(match outcome {
                        Ok(request) => AdoptionAction::RequestCreated {
                            command_id,
                            request,
                        },
                        Err(error) => AdoptionAction::RequestFailed { command_id, error },
                    })
                })]
            },

            AdoptionAction::DecideRequest {
                command_id,
                request_id,
                patch,
                deadline,
            } => {
                state.start(command_id, Command::Decide);
                let env = env.clone();
                smallvec![Effect::future(async move {
                    Some(match env.decide_request(&request_id, patch, deadline).await {
                        Ok(request) => AdoptionAction::RequestUpdated {
                            command_id,
                            request,
                        },
                        Err(error) => AdoptionAction::RequestFailed { command_id, error },
                    })
                })]
            },

            AdoptionAction::RequestCreated { command_id, .. } => {
                state.finish(command_id);
                state.created += 1;
                AdoptionMetrics::record_request("created");
                SmallVec::new()
            },

            AdoptionAction::RequestUpdated { command_id, .. } => {
                state.finish(command_id);
                state.updated += 1;
                SmallVec::new()
            },

            AdoptionAction::RequestFailed { command_id, error } => {
                let command = state.finish(command_id);
                state.failed += 1;
                if matches!(error, AdoptionError::Storage(_)) {
                    tracing::error!(%command_id, %error, "Adoption command failed");
                } else if matches!(error, AdoptionError::Expired(_)) {
                    tracing::warn!(%command_id, %error, "Adoption command expired");
                } else {
                    tracing::debug!(%command_id, %error, "Adoption command rejected");
                }
                // Validation failures never start, so they count as submissions.
                if command == Some(Command::Decide) {
                    AdoptionMetrics::record_decision(error.kind());
                } else {
                    AdoptionMetrics::record_request(error.kind());
                }
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
