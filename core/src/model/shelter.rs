//! Shelters.

use super::adopter::merge;
use super::ids::ShelterId;
use serde::{Deserialize, Serialize};

/// An organization housing pets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    #[serde(rename = "_id")]
    pub id: ShelterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Create payload for a shelter, also used as its partial update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShelter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update for a shelter.
pub type ShelterPatch = NewShelter;

impl NewShelter {
    /// Materialize the record under `id`
    #[must_use]
    pub fn into_shelter(self, id: ShelterId) -> Shelter {
        Shelter {
            id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            email: self.email,
        }
    }

    /// Merge provided fields into `shelter`
    pub fn apply(&self, shelter: &mut Shelter) {
        merge(&mut shelter.name, &self.name);
        merge(&mut shelter.address, &self.address);
        merge(&mut shelter.phone, &self.phone);
        merge(&mut shelter.email, &self.email);
    }
}
