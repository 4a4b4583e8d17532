//! Adoption requests.

use super::ids::{AdopterId, AdoptionRequestId, PetId};
use crate::error::{AdoptionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review state of an adoption request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting a decision
    #[default]
    Pending,
    /// Accepted; the pet is adopted
    Approved,
    /// Declined
    Rejected,
}

impl RequestStatus {
    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parse the wire representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether the request is still open
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Decide a requested status change.
    ///
    /// `Ok(None)` when `next` equals the current status.
    ///
    /// # Errors
    ///
    /// Returns a conflict for anything other than `PENDING → APPROVED` or
    /// `PENDING → REJECTED`.
    pub fn decide(self, next: Self) -> Result<Option<Self>> {
        match (self, next) {
            (a, b) if a == b => Ok(None),
            (Self::Pending, Self::Approved | Self::Rejected) => Ok(Some(next)),
            _ => Err(AdoptionError::Conflict(format!(
                "Invalid request status transition: {self} -> {next}"
            ))),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request by an adopter to adopt a pet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequest {
    /// Request id, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: AdoptionRequestId,
    /// Adopter making the request.
    pub adopter_id: AdopterId,
    /// Pet being requested.
    pub pet_id: PetId,
    /// When the request was submitted.
    pub request_date: DateTime<Utc>,
    /// Review status.
    #[serde(default)]
    pub status: RequestStatus,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl AdoptionRequest {
    /// A fresh `PENDING` request dated `now`
    #[must_use]
    pub const fn pending(
        id: AdoptionRequestId,
        adopter_id: AdopterId,
        pet_id: PetId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            adopter_id,
            pet_id,
            request_date: now,
            status: RequestStatus::Pending,
            comments,
        }
    }
}

/// Partial update for an adoption request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequestPatch {
    /// New review status.
    #[serde(default)]
    pub status: Option<RequestStatus>,
    /// Replacement notes.
    #[serde(default)]
    pub comments: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decisions() {
        use RequestStatus::{Approved, Pending, Rejected};
        assert_eq!(Pending.decide(Approved), Ok(Some(Approved)));
        assert_eq!(Pending.decide(Rejected), Ok(Some(Rejected)));
        assert_eq!(Approved.decide(Approved), Ok(None));
        assert!(Approved.decide(Pending).is_err());
        assert!(Rejected.decide(Approved).is_err());
        assert!(Approved.decide(Rejected).is_err());
    }

    #[test]
    fn request_wire_format() {
        let req = AdoptionRequest::pending(
            AdoptionRequestId::new("r1"),
            AdopterId::new("a1"),
            PetId::new("p1"),
            Some("has a yard".into()),
            Utc::now(),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["_id"], "r1");
        assert_eq!(json["adopterId"], "a1");
        assert_eq!(json["petId"], "p1");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["comments"], "has a yard");
        assert!(json.get("requestDate").is_some());
    }
}
