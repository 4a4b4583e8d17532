//! HTTP handlers, one module per resource.
//!
//! CRUD handlers talk to the repositories directly. Creating and deciding
//! adoption requests goes through the adoption store.

pub mod adopters;
pub mod auth;
pub mod health;
pub mod pets;
pub mod requests;
pub mod shelters;

use serde::Serialize;

/// `{ "message": ... }` body used for deletes and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Human-readable outcome
    pub message: &'static str,
}

impl Message {
    /// Wrap a static message
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
