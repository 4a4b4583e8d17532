//! # Pet Adoption Core
//!
//! Core traits and types for the pet adoption backend.
//!
//! This crate holds everything that does not perform I/O:
//!
//! - **Reducer / Effect**: the functional core that HTTP handlers dispatch into
//! - **Environment**: injected dependencies (clock, id generation)
//! - **Model**: pets, adopters, shelters and adoption requests
//! - **Status rules**: the pet and request lifecycles, centralized on the status enums
//! - **Repositories**: storage traits implemented by the in-memory and `PostgreSQL` backends
//!
//! ## Example
//!
//! ```
//! use pet_adoption_core::model::PetStatus;
//!
//! // Opening a request on an available pet moves it into process.
//! let next = PetStatus::Available.on_request_opened().ok().flatten();
//! assert_eq!(next, Some(PetStatus::InProcess));
//!
//! // Adopted pets cannot receive new requests.
//! assert!(PetStatus::Adopted.on_request_opened().is_err());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub mod error;
pub mod model;
pub mod repository;

pub use error::{AdoptionError, Result};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They validate commands, update in-memory bookkeeping and describe the I/O
/// that the runtime should perform next.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for AdoptionReducer {
    ///     type State = AdoptionState;
    ///     type Action = AdoptionAction;
    ///     type Environment = AdoptionEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut AdoptionState,
    ///         action: AdoptionAction,
    ///         env: &AdoptionEnvironment,
    ///     ) -> SmallVec<[Effect<AdoptionAction>; 4]> {
    ///         match action {
    ///             AdoptionAction::SubmitRequest { .. } => smallvec![/* persist */],
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Must not perform I/O. Anything touching storage is returned as an
        /// [`Effect`] and executed by the runtime, which feeds the resulting
        /// action back into this reducer.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned by reducers. The runtime decides when and
/// where to run them.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, retries)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation as an effect
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Emit an action immediately through the runtime's feedback loop
        ///
        /// Used for outcomes the reducer can decide on its own (e.g. validation
        /// failures), so that observers waiting on the action broadcast see them.
        pub fn send(action: Action) -> Self
        where
            Action: Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(action) }))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Identifier source for newly created records
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh, unique identifier
        fn next_id(&self) -> String;
    }

    /// Production id generator using random UUID v4 strings
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidIdGenerator;

    impl IdGenerator for UuidIdGenerator {
        fn next_id(&self) -> String {
            uuid::Uuid::new_v4().simple().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::environment::{IdGenerator, UuidIdGenerator};

    #[test]
    fn uuid_ids_are_unique() {
        let ids = UuidIdGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
