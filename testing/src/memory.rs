//! In-memory repositories.
//!
//! Back the API when no database is configured and give tests a store whose
//! writes can be counted and whose races can be staged.

use async_trait::async_trait;
use pet_adoption_core::error::{AdoptionError, Result};
use pet_adoption_core::model::{
    Adopter, AdopterId, AdopterPatch, AdoptionRequest, AdoptionRequestId, AdoptionRequestPatch,
    Pet, PetId, PetPatch, PetStatus, RequestStatus, Shelter, ShelterId, ShelterPatch,
};
use pet_adoption_core::repository::{
    AdopterRepository, AdoptionRequestRepository, PetRepository, ShelterRepository,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

fn poisoned() -> AdoptionError {
    AdoptionError::storage("in-memory store lock poisoned")
}

/// Insertion-ordered record list shared between clones.
#[derive(Debug)]
struct Table<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Clone> Table<T> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>> {
        self.rows.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>> {
        self.rows.write().map_err(|_| poisoned())
    }

    fn all(&self) -> Result<Vec<T>> {
        Ok(self.read()?.clone())
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Result<Option<T>> {
        Ok(self.read()?.iter().find(|r| pred(r)).cloned())
    }

    fn push(&self, row: T) -> Result<T> {
        self.write()?.push(row.clone());
        Ok(row)
    }

    fn modify(&self, pred: impl Fn(&T) -> bool, f: impl FnOnce(&mut T)) -> Result<Option<T>> {
        let mut rows = self.write()?;
        Ok(rows.iter_mut().find(|r| pred(r)).map(|row| {
            f(row);
            row.clone()
        }))
    }

    fn remove(&self, pred: impl Fn(&T) -> bool) -> Result<bool> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.retain(|r| !pred(r));
        Ok(rows.len() != before)
    }
}

/// In-memory pet store.
///
/// Counts successful status writes, and can stage a competing writer that
/// changes a pet's status right before the next conditional update. Reads
/// can be slowed down to stand in for a distant database.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPetRepository {
    pets: Table<Pet>,
    status_writes: Arc<AtomicUsize>,
    interference: Arc<RwLock<Option<PetStatus>>>,
    read_delay: Option<Duration>,
}

impl InMemoryPetRepository {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `pets`
    #[must_use]
    pub fn with_pets(pets: impl IntoIterator<Item = Pet>) -> Self {
        let repo = Self::new();
        if let Ok(mut rows) = repo.pets.write() {
            rows.extend(pets);
        }
        repo
    }

    /// Sleep for `delay` before answering each `get`
    #[must_use]
    pub const fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Number of successful status writes so far
    #[must_use]
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    /// Before the next conditional update, set the pet's status to `status`
    /// as if another request got there first.
    pub fn interfere_next_cas(&self, status: PetStatus) {
        if let Ok(mut slot) = self.interference.write() {
            *slot = Some(status);
        }
    }

    fn take_interference(&self) -> Result<Option<PetStatus>> {
        Ok(self.interference.write().map_err(|_| poisoned())?.take())
    }
}

#[async_trait]
impl PetRepository for InMemoryPetRepository {
    async fn list(&self) -> Result<Vec<Pet>> {
        self.pets.all()
    }

    async fn get(&self, id: &PetId) -> Result<Option<Pet>> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.pets.find(|p| &p.id == id)
    }

    async fn insert(&self, pet: Pet) -> Result<Pet> {
        self.pets.push(pet)
    }

    async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<Option<Pet>> {
        self.pets.modify(|p| &p.id == id, |p| patch.apply(p))
    }

    async fn compare_and_set_status(
        &self,
        id: &PetId,
        expected: PetStatus,
        next: PetStatus,
    ) -> Result<bool> {
        let interference = self.take_interference()?;
        let mut rows = self.pets.write()?;
        let Some(pet) = rows.iter_mut().find(|p| &p.id == id) else {
            return Ok(false);
        };
        if let Some(status) = interference {
            pet.status = status;
        }
        if pet.status != expected {
            return Ok(false);
        }
        pet.status = next;
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn delete(&self, id: &PetId) -> Result<bool> {
        self.pets.remove(|p| &p.id == id)
    }
}

/// In-memory adoption request store.
///
/// Like the pet store, can stage a competing writer that changes a request's
/// status right before the next conditional update.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAdoptionRequestRepository {
    requests: Table<AdoptionRequest>,
    interference: Arc<RwLock<Option<RequestStatus>>>,
}

impl InMemoryAdoptionRequestRepository {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `requests`
    #[must_use]
    pub fn with_requests(requests: impl IntoIterator<Item = AdoptionRequest>) -> Self {
        let repo = Self::new();
        if let Ok(mut rows) = repo.requests.write() {
            rows.extend(requests);
        }
        repo
    }

    /// Number of stored requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.read().map(|r| r.len()).unwrap_or_default()
    }

    /// Whether no request is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Before the next conditional update, set the request's status to
    /// `status` as if another reviewer got there first.
    pub fn interfere_next_update(&self, status: RequestStatus) {
        if let Ok(mut slot) = self.interference.write() {
            *slot = Some(status);
        }
    }

    fn take_interference(&self) -> Result<Option<RequestStatus>> {
        Ok(self.interference.write().map_err(|_| poisoned())?.take())
    }
}

#[async_trait]
impl AdoptionRequestRepository for InMemoryAdoptionRequestRepository {
    async fn list(&self) -> Result<Vec<AdoptionRequest>> {
        self.requests.all()
    }

    async fn get(&self, id: &AdoptionRequestId) -> Result<Option<AdoptionRequest>> {
        self.requests.find(|r| &r.id == id)
    }

    async fn insert(&self, request: AdoptionRequest) -> Result<AdoptionRequest> {
        self.requests.push(request)
    }

    async fn update(
        &self,
        id: &AdoptionRequestId,
        expected: RequestStatus,
        patch: &AdoptionRequestPatch,
    ) -> Result<Option<AdoptionRequest>> {
        let interference = self.take_interference()?;
        let mut rows = self.requests.write()?;
        let Some(request) = rows.iter_mut().find(|r| &r.id == id) else {
            return Ok(None);
        };
        if let Some(status) = interference {
            request.status = status;
        }
        if request.status != expected {
            return Ok(None);
        }
        if let Some(status) = patch.status {
            request.status = status;
        }
        if let Some(comments) = &patch.comments {
            request.comments = Some(comments.clone());
        }
        Ok(Some(request.clone()))
    }

    async fn delete(&self, id: &AdoptionRequestId) -> Result<bool> {
        self.requests.remove(|r| &r.id == id)
    }

    async fn count_pending_for_pet(
        &self,
        pet_id: &PetId,
        except: Option<&AdoptionRequestId>,
    ) -> Result<u64> {
        let rows = self.requests.read()?;
        let count = rows
            .iter()
            .filter(|r| &r.pet_id == pet_id && r.status.is_open())
            .filter(|r| except.is_none_or(|id| &r.id != id))
            .count();
        Ok(count as u64)
    }
}

/// In-memory adopter store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAdopterRepository {
    adopters: Table<Adopter>,
}

impl InMemoryAdopterRepository {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdopterRepository for InMemoryAdopterRepository {
    async fn list(&self) -> Result<Vec<Adopter>> {
        self.adopters.all()
    }

    async fn insert(&self, adopter: Adopter) -> Result<Adopter> {
        self.adopters.push(adopter)
    }

    async fn update(&self, id: &AdopterId, patch: &AdopterPatch) -> Result<Option<Adopter>> {
        self.adopters.modify(|a| &a.id == id, |a| patch.apply(a))
    }

    async fn delete(&self, id: &AdopterId) -> Result<bool> {
        self.adopters.remove(|a| &a.id == id)
    }
}

/// In-memory shelter store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryShelterRepository {
    shelters: Table<Shelter>,
}

impl InMemoryShelterRepository {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShelterRepository for InMemoryShelterRepository {
    async fn list(&self) -> Result<Vec<Shelter>> {
        self.shelters.all()
    }

    async fn insert(&self, shelter: Shelter) -> Result<Shelter> {
        self.shelters.push(shelter)
    }

    async fn update(&self, id: &ShelterId, patch: &ShelterPatch) -> Result<Option<Shelter>> {
        self.shelters.modify(|s| &s.id == id, |s| patch.apply(s))
    }

    async fn delete(&self, id: &ShelterId) -> Result<bool> {
        self.shelters.remove(|s| &s.id == id)
    }
}
