//! Domain model for the adoption backend.
//!
//! Records serialize with camelCase field names and expose their identifier
//! as `_id`, which is the shape the admin frontend consumes.

pub mod adopter;
pub mod adoption;
pub mod ids;
pub mod pet;
pub mod shelter;

pub use adopter::{Adopter, AdopterPatch, NewAdopter};
pub use adoption::{AdoptionRequest, AdoptionRequestPatch, RequestStatus};
pub use ids::{AdopterId, AdoptionRequestId, PetId, ShelterId, UserId};
pub use pet::{NewPet, Pet, PetPatch, PetStatus};
pub use shelter::{NewShelter, Shelter, ShelterPatch};
