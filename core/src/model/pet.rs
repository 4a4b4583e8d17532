//! Pets and the pet status lifecycle.

use super::ids::{PetId, ShelterId};
use crate::error::{AdoptionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of a pet for adoption.
///
/// ```text
/// AVAILABLE ──request opened──▶ IN_PROCESS ──approved──▶ ADOPTED
///     ▲                             │
///     └──────last open rejected─────┘
/// ```
///
/// `ADOPTED` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetStatus {
    /// Open for adoption requests
    #[default]
    Available,
    /// At least one request is under review
    InProcess,
    /// Adopted; no further changes allowed
    Adopted,
}

impl PetStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [Self; 3] = [Self::Available, Self::InProcess, Self::Adopted];

    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InProcess => "IN_PROCESS",
            Self::Adopted => "ADOPTED",
        }
    }

    /// Parse the wire representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(Self::Available),
            "IN_PROCESS" => Some(Self::InProcess),
            "ADOPTED" => Some(Self::Adopted),
            _ => None,
        }
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Adopted)
    }

    /// Whether `self → next` is one of the allowed moves
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::InProcess)
                | (Self::InProcess, Self::Adopted)
                | (Self::InProcess, Self::Available)
        )
    }

    /// Validate a status change.
    ///
    /// Every caller that moves a pet goes through here.
    ///
    /// # Errors
    ///
    /// Returns [`AdoptionError::Conflict`] for any move outside the lifecycle,
    /// including a same-status "move" and any change out of `ADOPTED`.
    pub fn transition_to(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else if self == Self::Adopted {
            Err(AdoptionError::pet_already_adopted())
        } else {
            Err(AdoptionError::Conflict(format!(
                "Invalid pet status transition: {self} -> {next}"
            )))
        }
    }

    /// Pet-side effect of opening a new adoption request.
    ///
    /// `Ok(Some(next))` means the pet must be written; `Ok(None)` means it
    /// stays as is.
    ///
    /// # Errors
    ///
    /// Returns `Pet already adopted` for an adopted pet.
    pub fn on_request_opened(self) -> Result<Option<Self>> {
        match self {
            Self::Available => self.transition_to(Self::InProcess).map(Some),
            Self::InProcess => Ok(None),
            Self::Adopted => Err(AdoptionError::pet_already_adopted()),
        }
    }

    /// Pet-side effect of approving a request.
    ///
    /// # Errors
    ///
    /// Returns a conflict unless the pet is `IN_PROCESS`.
    pub fn on_request_approved(self) -> Result<Self> {
        self.transition_to(Self::Adopted)
    }

    /// Pet-side effect of rejecting a request.
    ///
    /// The pet reverts to `AVAILABLE` only when it is `IN_PROCESS` and no
    /// other pending request remains for it.
    #[must_use]
    pub fn on_request_rejected(self, other_pending: bool) -> Option<Self> {
        match self {
            Self::InProcess if !other_pending => Some(Self::Available),
            _ => None,
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pet held by a shelter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Pet id, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: PetId,
    /// Shelter holding the pet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelter_id: Option<ShelterId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Species, e.g. `dog`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    /// Breed, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Age in whole years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
    /// Sex, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    /// Adoption lifecycle status.
    #[serde(default)]
    pub status: PetStatus,
    /// When the shelter took the pet in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_date: Option<DateTime<Utc>>,
}

/// Create payload for a pet. The id is assigned by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    /// Shelter holding the pet.
    #[serde(default)]
    pub shelter_id: Option<ShelterId>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Species, e.g. `dog`.
    #[serde(default)]
    pub species: Option<String>,
    /// Breed, free text.
    #[serde(default)]
    pub breed: Option<String>,
    /// Age in whole years.
    #[serde(default)]
    pub age_years: Option<u32>,
    /// Sex, free text.
    #[serde(default)]
    pub sex: Option<String>,
    /// Requested status; defaults to `AVAILABLE`.
    #[serde(default)]
    pub status: Option<PetStatus>,
    /// When the shelter took the pet in.
    #[serde(default)]
    pub intake_date: Option<DateTime<Utc>>,
}

impl NewPet {
    /// Materialize the record with defaults applied
    #[must_use]
    pub fn into_pet(self, id: PetId) -> Pet {
        Pet {
            id,
            shelter_id: self.shelter_id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            age_years: self.age_years,
            sex: self.sex,
            status: self.status.unwrap_or_default(),
            intake_date: self.intake_date,
        }
    }
}

/// Partial update for a pet.
///
/// `status` is carried here but never applied by [`PetPatch::apply`]; status
/// changes are validated with [`PetStatus::transition_to`] and written with a
/// conditional update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPatch {
    /// Shelter holding the pet.
    #[serde(default)]
    pub shelter_id: Option<ShelterId>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Species, e.g. `dog`.
    #[serde(default)]
    pub species: Option<String>,
    /// Breed, free text.
    #[serde(default)]
    pub breed: Option<String>,
    /// Age in whole years.
    #[serde(default)]
    pub age_years: Option<u32>,
    /// Sex, free text.
    #[serde(default)]
    pub sex: Option<String>,
    /// Requested status transition.
    #[serde(default)]
    pub status: Option<PetStatus>,
    /// When the shelter took the pet in.
    #[serde(default)]
    pub intake_date: Option<DateTime<Utc>>,
}

impl PetPatch {
    /// Merge the provided non-status fields into `pet`
    pub fn apply(&self, pet: &mut Pet) {
        if let Some(v) = &self.shelter_id {
            pet.shelter_id = Some(v.clone());
        }
        if let Some(v) = &self.name {
            pet.name = Some(v.clone());
        }
        if let Some(v) = &self.species {
            pet.species = Some(v.clone());
        }
        if let Some(v) = &self.breed {
            pet.breed = Some(v.clone());
        }
        if let Some(v) = self.age_years {
            pet.age_years = Some(v);
        }
        if let Some(v) = &self.sex {
            pet.sex = Some(v.clone());
        }
        if let Some(v) = self.intake_date {
            pet.intake_date = Some(v);
        }
    }

    /// Copy of this patch without the status field
    #[must_use]
    pub fn without_status(&self) -> Self {
        Self {
            status: None,
            ..self.clone()
        }
    }
}
