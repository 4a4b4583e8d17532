//! `PostgreSQL` repositories for the pet adoption backend.
//!
//! Implements the storage traits of `pet-adoption-core` (and the user store
//! of `pet-adoption-auth`) with runtime-checked `sqlx` queries. The schema
//! lives in `./migrations` and is applied with [`migrate`].
//!
//! # Example
//!
//! ```no_run
//! use pet_adoption_postgres::{connect, migrate, PgRepositories};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect("postgres://localhost/pets", 10, Duration::from_secs(5)).await?;
//! migrate(&pool).await?;
//! let repos = PgRepositories::new(pool);
//! # Ok(())
//! # }
//! ```

use pet_adoption_core::AdoptionError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

mod adopters;
mod pets;
mod requests;
mod shelters;
mod users;

pub use adopters::PgAdopterRepository;
pub use pets::PgPetRepository;
pub use requests::PgAdoptionRequestRepository;
pub use shelters::PgShelterRepository;
pub use users::PgUserRepository;

/// Open a connection pool.
///
/// `acquire_timeout` bounds how long any store call waits for a connection.
///
/// # Errors
///
/// Returns [`AdoptionError::Storage`] if the database cannot be reached.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, AdoptionError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| AdoptionError::storage(format!("Failed to connect: {e}")))?;
    tracing::info!(max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns [`AdoptionError::Storage`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), AdoptionError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AdoptionError::storage(format!("Migration failed: {e}")))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Round-trip a trivial query, for readiness checks.
///
/// # Errors
///
/// Returns [`AdoptionError::Storage`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), AdoptionError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(AdoptionError::storage)
}

/// Every repository, sharing one pool.
#[derive(Clone, Debug)]
pub struct PgRepositories {
    /// Pet store
    pub pets: PgPetRepository,
    /// Adoption request store
    pub requests: PgAdoptionRequestRepository,
    /// Adopter store
    pub adopters: PgAdopterRepository,
    /// Shelter store
    pub shelters: PgShelterRepository,
    /// User store
    pub users: PgUserRepository,
}

impl PgRepositories {
    /// Build all repositories over `pool`
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pets: PgPetRepository::new(pool.clone()),
            requests: PgAdoptionRequestRepository::new(pool.clone()),
            adopters: PgAdopterRepository::new(pool.clone()),
            shelters: PgShelterRepository::new(pool.clone()),
            users: PgUserRepository::new(pool),
        }
    }
}

fn db_error(operation: &'static str) -> impl Fn(sqlx::Error) -> AdoptionError {
    move |e| {
        metrics::counter!("postgres.errors", "operation" => operation).increment(1);
        AdoptionError::storage(format!("{operation}: {e}"))
    }
}
