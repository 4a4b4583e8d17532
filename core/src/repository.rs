//! Storage traits for the domain records.
//!
//! Implemented by the in-memory stores in `pet-adoption-testing` and by the
//! `PostgreSQL` stores in `pet-adoption-postgres`. Handlers and the adoption
//! environment only ever see these traits behind an `Arc<dyn ...>`.

use crate::error::Result;
use crate::model::{
    Adopter, AdopterId, AdopterPatch, AdoptionRequest, AdoptionRequestId, AdoptionRequestPatch,
    Pet, PetId, PetPatch, PetStatus, RequestStatus, Shelter, ShelterId, ShelterPatch,
};
use async_trait::async_trait;

/// Pet store.
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// All pets
    async fn list(&self) -> Result<Vec<Pet>>;

    /// One pet by id
    async fn get(&self, id: &PetId) -> Result<Option<Pet>>;

    /// Insert a new pet
    async fn insert(&self, pet: Pet) -> Result<Pet>;

    /// Merge non-status fields; `None` if the pet does not exist
    async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<Option<Pet>>;

    /// Set `status` to `next` only if it currently equals `expected`.
    ///
    /// Returns `true` when the write happened. `false` means the pet is gone
    /// or another writer changed its status first.
    async fn compare_and_set_status(
        &self,
        id: &PetId,
        expected: PetStatus,
        next: PetStatus,
    ) -> Result<bool>;

    /// Remove a pet; `false` if it did not exist
    async fn delete(&self, id: &PetId) -> Result<bool>;
}

/// Adoption request store.
#[async_trait]
pub trait AdoptionRequestRepository: Send + Sync {
    /// All requests
    async fn list(&self) -> Result<Vec<AdoptionRequest>>;

    /// One request by id
    async fn get(&self, id: &AdoptionRequestId) -> Result<Option<AdoptionRequest>>;

    /// Insert a new request
    async fn insert(&self, request: AdoptionRequest) -> Result<AdoptionRequest>;

    /// Merge the provided fields only if the status is still `expected`.
    ///
    /// `None` means the request is gone or another writer changed its status
    /// first. Transition rules are checked before this is called.
    async fn update(
        &self,
        id: &AdoptionRequestId,
        expected: RequestStatus,
        patch: &AdoptionRequestPatch,
    ) -> Result<Option<AdoptionRequest>>;

    /// Remove a request; `false` if it did not exist
    async fn delete(&self, id: &AdoptionRequestId) -> Result<bool>;

    /// Number of `PENDING` requests for `pet_id`, excluding `except`
    async fn count_pending_for_pet(
        &self,
        pet_id: &PetId,
        except: Option<&AdoptionRequestId>,
    ) -> Result<u64>;
}

/// Adopter store.
#[async_trait]
pub trait AdopterRepository: Send + Sync {
    /// All adopters
    async fn list(&self) -> Result<Vec<Adopter>>;

    /// Insert a new adopter
    async fn insert(&self, adopter: Adopter) -> Result<Adopter>;

    /// Merge provided fields; `None` if absent
    async fn update(&self, id: &AdopterId, patch: &AdopterPatch) -> Result<Option<Adopter>>;

    /// Remove; `false` if absent
    async fn delete(&self, id: &AdopterId) -> Result<bool>;
}

/// Shelter store.
#[async_trait]
pub trait ShelterRepository: Send + Sync {
    /// All shelters
    async fn list(&self) -> Result<Vec<Shelter>>;

    /// Insert a new shelter
    async fn insert(&self, shelter: Shelter) -> Result<Shelter>;

    /// Merge provided fields; `None` if absent
    async fn update(&self, id: &ShelterId, patch: &ShelterPatch) -> Result<Option<Shelter>>;

    /// Remove; `false` if absent
    async fn delete(&self, id: &ShelterId) -> Result<bool>;
}
