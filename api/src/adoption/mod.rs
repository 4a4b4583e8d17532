//! The adoption-request workflow.
//!
//! ```text
//! handler ──SubmitRequest / DecideRequest──▶ Store ──▶ AdoptionReducer
//!                                                         │ validate
//!                                                         ▼
//!                                          Effect::future(AdoptionEnvironment)
//!                                                         │ CAS pet status,
//!                                                         │ persist request
//!                                                         ▼
//! handler ◀──RequestCreated / RequestUpdated / RequestFailed (broadcast)
//! ```
//!
//! Handlers wait with `Store::send_and_wait_for`, matching on the command id
//! they generated.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;

pub use actions::AdoptionAction;
pub use environment::AdoptionEnvironment;
pub use reducer::AdoptionReducer;
pub use state::AdoptionState;

/// The store type the HTTP layer dispatches adoption commands to.
pub type AdoptionStore =
    pet_adoption_runtime::Store<AdoptionState, AdoptionAction, AdoptionEnvironment, AdoptionReducer>;
