//! Workflow bookkeeping kept by the adoption store.

use pet_adoption_core::AdoptionError;
use std::collections::HashMap;
use uuid::Uuid;

/// Kind of command waiting on an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `SubmitRequest`
    Submit,
    /// `DecideRequest`
    Decide,
}

/// Commands in flight and outcome counters.
///
/// Records live in the repositories; this state only tracks what the
/// workflow itself is doing.
#[derive(Clone, Debug, Default)]
pub struct AdoptionState {
    in_flight: HashMap<Uuid, Command>,
    /// Requests created since start
    pub created: u64,
    /// Requests edited since start
    pub updated: u64,
    /// Commands rejected or failed since start
    pub failed: u64,
    /// Most recent failure
    pub last_error: Option<AdoptionError>,
}

impl AdoptionState {
    /// Number of commands waiting on an effect.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether `command_id` is waiting on an effect.
    #[must_use]
    pub fn is_in_flight(&self, command_id: Uuid) -> bool {
        self.in_flight.contains_key(&command_id)
    }

    pub(crate) fn start(&mut self, command_id: Uuid, command: Command) {
        self.in_flight.insert(command_id, command);
    }

    pub(crate) fn finish(&mut self, command_id: Uuid) -> Option<Command> {
        self.in_flight.remove(&command_id)
    }
}
