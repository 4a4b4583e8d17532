//! Application state for the HTTP server.
//!
//! Holds the adoption store, the repositories the CRUD handlers read and
//! write directly, and the auth service. Cloned (cheaply, via `Arc`) for
//! each request.

use crate::adoption::{AdoptionEnvironment, AdoptionReducer, AdoptionState, AdoptionStore};
use axum::extract::FromRef;
use pet_adoption_auth::mocks::InMemoryUserRepository;
use pet_adoption_auth::{AuthService, TokenConfig, TokenSigner, UserRepository};
use pet_adoption_core::environment::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use pet_adoption_core::repository::{
    AdopterRepository, AdoptionRequestRepository, PetRepository, ShelterRepository,
};
use pet_adoption_postgres::PgRepositories;
use pet_adoption_testing::{
    InMemoryAdopterRepository, InMemoryAdoptionRequestRepository, InMemoryPetRepository,
    InMemoryShelterRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// One handle per record store.
#[derive(Clone)]
pub struct Repositories {
    /// Pets
    pub pets: Arc<dyn PetRepository>,
    /// Adoption requests
    pub requests: Arc<dyn AdoptionRequestRepository>,
    /// Adopters
    pub adopters: Arc<dyn AdopterRepository>,
    /// Shelters
    pub shelters: Arc<dyn ShelterRepository>,
    /// Users
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            pets: Arc::new(InMemoryPetRepository::new()),
            requests: Arc::new(InMemoryAdoptionRequestRepository::new()),
            adopters: Arc::new(InMemoryAdopterRepository::new()),
            shelters: Arc::new(InMemoryShelterRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

impl From<PgRepositories> for Repositories {
    fn from(pg: PgRepositories) -> Self {
        Self {
            pets: Arc::new(pg.pets),
            requests: Arc::new(pg.requests),
            adopters: Arc::new(pg.adopters),
            shelters: Arc::new(pg.shelters),
            users: Arc::new(pg.users),
        }
    }
}

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Adoption workflow store
    pub adoption: Arc<AdoptionStore>,
    /// Record stores
    pub repos: Repositories,
    /// Register, login and token checks
    pub auth: AuthService,
    /// Server-assigned ids for new records
    pub ids: Arc<dyn IdGenerator>,
    /// How long a handler waits for the adoption workflow
    pub request_timeout: Duration,
    /// Pool for readiness checks; `None` with in-memory stores
    pub database: Option<PgPool>,
}

impl AppState {
    /// Wire the adoption store and auth service over `repos`.
    #[must_use]
    pub fn new(
        repos: Repositories,
        token: TokenConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        request_timeout: Duration,
    ) -> Self {
        let env = AdoptionEnvironment::new(
            Arc::clone(&repos.pets),
            Arc::clone(&repos.requests),
            Arc::clone(&clock),
            Arc::clone(&ids),
        );
        let adoption = Arc::new(AdoptionStore::new(
            AdoptionState::default(),
            AdoptionReducer::new(),
            env,
        ));
        let auth = AuthService::new(
            Arc::clone(&repos.users),
            TokenSigner::new(token),
            clock,
            Arc::clone(&ids),
        );

        Self {
            adoption,
            repos,
            auth,
            ids,
            request_timeout,
            database: None,
        }
    }

    /// Production wiring: system clock and UUID ids.
    #[must_use]
    pub fn with_system_defaults(
        repos: Repositories,
        token: TokenConfig,
        request_timeout: Duration,
    ) -> Self {
        Self::new(
            repos,
            token,
            Arc::new(SystemClock),
            Arc::new(UuidIdGenerator),
            request_timeout,
        )
    }

    /// Attach the pool checked by `/ready`.
    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    /// Next server-assigned record id.
    #[must_use]
    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
