//! Error types for the adoption domain.

use thiserror::Error;

/// Result type alias for domain and repository operations.
pub type Result<T> = std::result::Result<T, AdoptionError>;

/// Message returned when the adopter or pet reference is missing.
pub const REQUIRED_FIELDS: &str = "Required fields";

/// Message returned when the referenced pet does not exist.
pub const PET_NOT_FOUND: &str = "Pet not found";

/// Message returned when a request targets a pet that is already adopted.
pub const PET_ALREADY_ADOPTED: &str = "Pet already adopted";

/// Message returned when a command's deadline passes before it wrote anything.
pub const DEADLINE_PASSED: &str = "Request timed out before any change was made";

/// Error taxonomy for the adoption domain.
///
/// Business-rule violations (`Validation`, `NotFound`, `Conflict`) are kept
/// apart from `Storage` faults so the HTTP layer never reports an
/// infrastructure failure as a client error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdoptionError {
    /// Input is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request contradicts the current state of a record.
    #[error("{0}")]
    Conflict(String),

    /// The caller's deadline passed before anything was written.
    #[error("{0}")]
    Expired(String),

    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AdoptionError {
    /// Adopter or pet reference missing.
    #[must_use]
    pub fn required_fields() -> Self {
        Self::Validation(REQUIRED_FIELDS.to_string())
    }

    /// Referenced pet absent from the pet store.
    #[must_use]
    pub fn pet_not_found() -> Self {
        Self::NotFound(PET_NOT_FOUND.to_string())
    }

    /// Pet has reached the terminal `ADOPTED` status.
    #[must_use]
    pub fn pet_already_adopted() -> Self {
        Self::Conflict(PET_ALREADY_ADOPTED.to_string())
    }

    /// Deadline passed with nothing written.
    #[must_use]
    pub fn deadline_passed() -> Self {
        Self::Expired(DEADLINE_PASSED.to_string())
    }

    /// Record of the given kind not found.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    /// Wrap a storage-layer failure.
    #[must_use]
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Short label used for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Expired(_) => "expired",
            Self::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_wire_contract() {
        assert_eq!(AdoptionError::required_fields().to_string(), "Required fields");
        assert_eq!(AdoptionError::pet_not_found().to_string(), "Pet not found");
        assert_eq!(
            AdoptionError::pet_already_adopted().to_string(),
            "Pet already adopted"
        );
        assert_eq!(AdoptionError::not_found("Adopter").to_string(), "Adopter not found");
        assert_eq!(AdoptionError::deadline_passed().kind(), "expired");
    }

    #[test]
    fn storage_errors_are_labelled() {
        let err = AdoptionError::storage("connection reset");
        assert_eq!(err.kind(), "storage");
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }
}
