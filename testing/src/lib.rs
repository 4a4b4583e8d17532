//! # Pet Adoption Testing
//!
//! Testing utilities for the pet adoption backend.
//!
//! This crate provides:
//! - Deterministic [`Clock`](pet_adoption_core::environment::Clock) and
//!   [`IdGenerator`](pet_adoption_core::environment::IdGenerator) implementations
//! - In-memory repositories, also used by the API when no database is configured
//! - [`ReducerTest`], a Given-When-Then builder for reducers
//!
//! ## Example
//!
//! ```ignore
//! use pet_adoption_testing::{test_clock, InMemoryPetRepository};
//!
//! #[tokio::test]
//! async fn request_moves_pet() {
//!     let pets = InMemoryPetRepository::with_pets([available_pet("p1")]);
//!     let env = AdoptionEnvironment::new(/* ... */);
//!     // ...
//!     assert_eq!(pets.status_writes(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use pet_adoption_core::environment::{Clock, IdGenerator};

pub mod memory;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use pet_adoption_testing::mocks::FixedClock;
    /// use pet_adoption_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// The instant this clock reports
        #[must_use]
        pub const fn time(&self) -> DateTime<Utc> {
            self.time
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// Id generator yielding `<prefix>-1`, `<prefix>-2`, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator with the given prefix
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new("id")
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }
}

// Re-export commonly used items
pub use memory::{
    InMemoryAdopterRepository, InMemoryAdoptionRequestRepository, InMemoryPetRepository,
    InMemoryShelterRepository,
};
pub use mocks::{FixedClock, SequentialIdGenerator, test_clock};
pub use reducer_test::ReducerTest;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_new_year_2025() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn sequential_ids() {
        let ids = SequentialIdGenerator::new("req");
        assert_eq!(ids.next_id(), "req-1");
        assert_eq!(ids.next_id(), "req-2");
    }
}
