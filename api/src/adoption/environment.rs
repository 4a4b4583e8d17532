//! Side-effecting half of the adoption workflow.
//!
//! The reducer decides *whether* to touch storage; the methods here do it.
//! Pet and request status are only ever written through a compare-and-set
//! scoped to the status the decision was based on.
//!
//! Each command carries the deadline its caller waits for. Past it, nothing
//! is written; once the first write lands, the command runs to the end.

use pet_adoption_core::environment::{Clock, IdGenerator};
use pet_adoption_core::error::{AdoptionError, Result};
use pet_adoption_core::model::{
    AdopterId, AdoptionRequest, AdoptionRequestId, AdoptionRequestPatch, PetId, PetStatus,
    RequestStatus,
};
use pet_adoption_core::repository::{AdoptionRequestRepository, PetRepository};
use pet_adoption_runtime::metrics::AdoptionMetrics;
use std::sync::Arc;
use tokio::time::Instant;

/// Default number of read-decide-write rounds before giving up on a pet.
pub const DEFAULT_STATUS_ATTEMPTS: usize = 3;

/// Dependencies of the adoption workflow.
#[derive(Clone)]
pub struct AdoptionEnvironment {
    pets: Arc<dyn PetRepository>,
    requests: Arc<dyn AdoptionRequestRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    status_attempts: usize,
}

impl AdoptionEnvironment {
    /// Create a new environment.
    #[must_use]
    pub fn new(
        pets: Arc<dyn PetRepository>,
        requests: Arc<dyn AdoptionRequestRepository>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            pets,
            requests,
            clock,
            ids,
            status_attempts: DEFAULT_STATUS_ATTEMPTS,
        }
    }

    /// Override how many times a lost compare-and-set is retried.
    #[must_use]
    pub const fn with_status_attempts(mut self, attempts: usize) -> Self {
        self.status_attempts = if attempts == 0 { 1 } else { attempts };
        self
    }

    /// Open a request against a pet.
    ///
    /// An `AVAILABLE` pet is moved to `IN_PROCESS` before the request is
    /// stored; an `IN_PROCESS` pet is left alone.
    ///
    /// # Errors
    ///
    /// - `Pet not found` if the pet is missing (or vanishes mid-way)
    /// - `Pet already adopted` if the pet is `ADOPTED`
    /// - [`AdoptionError::Expired`] if `deadline` passes before the first write
    /// - [`AdoptionError::Storage`] if a store call fails
    #[tracing::instrument(skip(self, comments, deadline), fields(adopter_id = %adopter_id, pet_id = %pet_id))]
    pub async fn create_request(
        &self,
        adopter_id: AdopterId,
        pet_id: PetId,
        comments: Option<String>,
        deadline: Instant,
    ) -> Result<AdoptionRequest> {
        let moved = self
            .advance_pet(&pet_id, Some(deadline), PetStatus::on_request_opened)
            .await?;
        // Without a pet write the insert is the first write.
        if moved.is_none() {
            ensure_before(deadline)?;
        }

        let request = AdoptionRequest::pending(
            AdoptionRequestId::new(self.ids.next_id()),
            adopter_id,
            pet_id,
            comments,
            self.clock.now(),
        );
        let request = self.requests.insert(request).await?;

        tracing::info!(request_id = %request.id, "Adoption request created");
        Ok(request)
    }

    /// Edit a request, applying the pet-side effect of a decision.
    ///
    /// - `PENDING → APPROVED`: the pet must be `IN_PROCESS`; the request is
    ///   saved, then the pet becomes `ADOPTED`. If the pet moved meanwhile the
    ///   request goes back to `PENDING`
    /// - `PENDING → REJECTED`: the request is saved, then the pet reverts to
    ///   `AVAILABLE` if no other pending request remains for it
    /// - same status: no decision, other fields still merge
    ///
    /// The request write only lands if its status is still the one read, so
    /// of two concurrent decisions exactly one wins.
    ///
    /// # Errors
    ///
    /// - `Adoption request not found`
    /// - [`AdoptionError::Conflict`] for an illegal request or pet transition,
    ///   or when another decision lands first
    /// - [`AdoptionError::Expired`] if `deadline` passes before the first write
    /// - [`AdoptionError::Storage`] if a store call fails
    #[tracing::instrument(skip(self, patch, deadline), fields(request_id = %request_id))]
    pub async fn decide_request(
        &self,
        request_id: &AdoptionRequestId,
        patch: AdoptionRequestPatch,
        deadline: Instant,
    ) -> Result<AdoptionRequest> {
        let current = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(request_not_found)?;

        let decision = match patch.status {
            Some(next) => current.status.decide(next)?,
            None => None,
        };

        if decision == Some(RequestStatus::Approved) {
            let pet = self
                .pets
                .get(&current.pet_id)
                .await?
                .ok_or_else(AdoptionError::pet_not_found)?;
            pet.status.on_request_approved()?;
        }

        ensure_before(deadline)?;
        let patch = AdoptionRequestPatch {
            status: decision,
            comments: patch.comments,
        };
        let updated = self
            .write_request(request_id, current.status, &patch)
            .await?;

        match decision {
            Some(RequestStatus::Approved) => {
                let adopted = self
                    .advance_pet(&updated.pet_id, None, |status| {
                        status.on_request_approved().map(Some)
                    })
                    .await;
                if let Err(err) = adopted {
                    self.reopen(&updated).await;
                    return Err(err);
                }
            },
            Some(RequestStatus::Rejected) => self.release_pet(&updated).await?,
            Some(RequestStatus::Pending) | None => {},
        }

        AdoptionMetrics::record_decision(decision.map_or("unchanged", |s| match s {
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Pending => "unchanged",
        }));
        Ok(updated)
    }

    /// Conditional request write, telling a vanished request from a lost race.
    async fn write_request(
        &self,
        request_id: &AdoptionRequestId,
        expected: RequestStatus,
        patch: &AdoptionRequestPatch,
    ) -> Result<AdoptionRequest> {
        if let Some(updated) = self.requests.update(request_id, expected, patch).await? {
            return Ok(updated);
        }
        if self.requests.get(request_id).await?.is_none() {
            return Err(request_not_found());
        }
        AdoptionMetrics::record_cas_conflict();
        tracing::debug!(%expected, "Request status changed concurrently");
        Err(AdoptionError::Conflict(
            "Adoption request status changed concurrently".to_string(),
        ))
    }

    /// Put an approved request back to `PENDING` after its pet could not be
    /// adopted.
    async fn reopen(&self, approved: &AdoptionRequest) {
        let patch = AdoptionRequestPatch {
            status: Some(RequestStatus::Pending),
            comments: None,
        };
        match self
            .requests
            .update(&approved.id, RequestStatus::Approved, &patch)
            .await
        {
            Ok(Some(_)) => tracing::debug!(request_id = %approved.id, "Approval rolled back"),
            Ok(None) => {
                tracing::warn!(request_id = %approved.id, "Approved request changed before rollback");
            },
            Err(err) => {
                tracing::error!(request_id = %approved.id, error = %err, "Failed to roll back approval");
            },
        }
    }

    /// Revert an `IN_PROCESS` pet once its last pending request is gone.
    async fn release_pet(&self, rejected: &AdoptionRequest) -> Result<()> {
        let others = self
            .requests
            .count_pending_for_pet(&rejected.pet_id, Some(&rejected.id))
            .await?;

        match self
            .advance_pet(&rejected.pet_id, None, |status| {
                Ok(status.on_request_rejected(others > 0))
            })
            .await
        {
            Ok(_) => Ok(()),
            Err(AdoptionError::NotFound(_)) => {
                tracing::debug!(pet_id = %rejected.pet_id, "Rejected request for a deleted pet");
                Ok(())
            },
            Err(err) => Err(err),
        }
    }

    /// Read the pet, decide its next status, and write it conditionally.
    ///
    /// A lost compare-and-set re-reads the pet and decides again, up to the
    /// configured number of attempts. Returns the new status, or `None` when
    /// `decide` chose not to write. With a `deadline`, no write is attempted
    /// once it has passed.
    async fn advance_pet<F>(
        &self,
        pet_id: &PetId,
        deadline: Option<Instant>,
        decide: F,
    ) -> Result<Option<PetStatus>>
    where
        F: Fn(PetStatus) -> Result<Option<PetStatus>> + Send + Sync,
    {
        for attempt in 1..=self.status_attempts {
            let pet = self
                .pets
                .get(pet_id)
                .await?
                .ok_or_else(AdoptionError::pet_not_found)?;

            let Some(next) = decide(pet.status)? else {
                return Ok(None);
            };
            if let Some(deadline) = deadline {
                ensure_before(deadline)?;
            }

            if self
                .pets
                .compare_and_set_status(pet_id, pet.status, next)
                .await?
            {
                tracing::debug!(from = %pet.status, to = %next, "Pet status written");
                AdoptionMetrics::record_transition(pet.status, next);
                return Ok(Some(next));
            }

            AdoptionMetrics::record_cas_conflict();
            tracing::debug!(attempt, expected = %pet.status, "Pet status changed concurrently");
        }

        Err(AdoptionError::Conflict(
            "Pet status changed concurrently".to_string(),
        ))
    }
}

fn request_not_found() -> AdoptionError {
    AdoptionError::not_found("Adoption request")
}

fn ensure_before(deadline: Instant) -> Result<()> {
    if Instant::now() >= deadline {
        tracing::warn!("Deadline passed before the first write, abandoning command");
        return Err(AdoptionError::deadline_passed());
    }
    Ok(())
}
