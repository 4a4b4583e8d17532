//! Adopters.

use super::ids::AdopterId;
use serde::{Deserialize, Serialize};

/// A person applying to adopt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adopter {
    #[serde(rename = "_id")]
    pub id: AdopterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Create payload for an adopter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdopter {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewAdopter {
    /// Materialize the record under `id`
    #[must_use]
    pub fn into_adopter(self, id: AdopterId) -> Adopter {
        Adopter {
            id,
            full_name: self.full_name,
            national_id: self.national_id,
            phone: self.phone,
            email: self.email,
            address: self.address,
        }
    }
}

/// Partial update for an adopter. Absent fields are left unchanged.
pub type AdopterPatch = NewAdopter;

impl AdopterPatch {
    /// Merge provided fields into `adopter`
    pub fn apply(&self, adopter: &mut Adopter) {
        merge(&mut adopter.full_name, &self.full_name);
        merge(&mut adopter.national_id, &self.national_id);
        merge(&mut adopter.phone, &self.phone);
        merge(&mut adopter.email, &self.email);
        merge(&mut adopter.address, &self.address);
    }
}

pub(crate) fn merge(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}
