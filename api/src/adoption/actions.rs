//! Actions for the adoption workflow.

use pet_adoption_core::AdoptionError;
use pet_adoption_core::model::{AdoptionRequest, AdoptionRequestId, AdoptionRequestPatch};
use tokio::time::Instant;
use uuid::Uuid;

/// Commands issued by handlers and outcomes produced by effects.
///
/// Every action carries the `command_id` of the command it belongs to, so a
/// handler waiting on the store's action broadcast can pick out its reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdoptionAction {
    // Commands
    /// Open a new adoption request.
    SubmitRequest {
        /// Id of this command
        command_id: Uuid,
        /// Raw adopter reference as posted
        adopter_id: Option<String>,
        /// Raw pet reference as posted
        pet_id: Option<String>,
        /// Free-text comments
        comments: Option<String>,
        /// Nothing is written once this has passed
        deadline: Instant,
    },
    /// Edit a request; a status change is an approval or rejection.
    DecideRequest {
        /// Id of this command
        command_id: Uuid,
        /// Request to edit
        request_id: AdoptionRequestId,
        /// Fields to change
        patch: AdoptionRequestPatch,
        /// Nothing is written once this has passed
        deadline: Instant,
    },

    // Outcomes
    /// Request persisted.
    RequestCreated {
        /// Command this answers
        command_id: Uuid,
        /// Stored request
        request: AdoptionRequest,
    },
    /// Request edited.
    RequestUpdated {
        /// Command this answers
        command_id: Uuid,
        /// Stored request after the edit
        request: AdoptionRequest,
    },
    /// Command rejected or failed.
    RequestFailed {
        /// Command this answers
        command_id: Uuid,
        /// Why
        error: AdoptionError,
    },
}

impl AdoptionAction {
    /// Command id carried by this action.
    #[must_use]
    pub const fn command_id(&self) -> Uuid {
        match self {
            Self::SubmitRequest { command_id, .. }
            | Self::DecideRequest { command_id, .. }
            | Self::RequestCreated { command_id, .. }
            | Self::RequestUpdated { command_id, .. }
            | Self::RequestFailed { command_id, .. } => *command_id,
        }
    }

    /// Whether this action ends a command.
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        matches!(
            self,
            Self::RequestCreated { .. } | Self::RequestUpdated { .. } | Self::RequestFailed { .. }
        )
    }

    /// Whether this action is the outcome of command `command_id`.
    #[must_use]
    pub fn is_outcome_for(&self, command_id: Uuid) -> bool {
        self.is_outcome() && self.command_id() == command_id
    }
}
