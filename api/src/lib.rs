//! Pet adoption REST API.
//!
//! CRUD for adopters, shelters, pets and adoption requests, bearer-token
//! authentication, and the adoption workflow that keeps each pet's status
//! consistent with the requests made for it.
//!
//! The server runs against PostgreSQL when `DATABASE_URL` is set and against
//! in-memory stores otherwise.

pub mod adoption;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::{Config, ConfigError};
pub use router::router;
pub use state::{AppState, Repositories};
