//! # Todoflow Testing
//!
//! Testing utilities and helpers for the todoflow state core.
//!
//! This crate provides:
//! - Deterministic clocks for reproducible timestamps
//! - A fluent Given-When-Then harness for the pure transition function
//! - Async probes for awaiting state predicates and collecting one-shot
//!   effects with timeouts
//!
//! ## Example
//!
//! ```ignore
//! use todoflow_testing::{test_clock, TransitionTest};
//! use todoflow_runtime::event::TodoEvent;
//! use todoflow_runtime::state::UiState;
//!
//! TransitionTest::new()
//!     .given_state(UiState::initial())
//!     .when_event(TodoEvent::TitleChanged("Buy milk".into()))
//!     .then_state(|state| assert_eq!(state.title_input, "Buy milk"))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todoflow_core::clock::Clock;

pub mod probes;

/// Mock implementations of injected dependencies.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests.
    ///
    /// Always returns the same time until explicitly advanced, making
    /// ordering-sensitive tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todoflow_testing::mocks::FixedClock;
    /// use todoflow_core::clock::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug)]
    pub struct FixedClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward by the given number of seconds.
        ///
        /// # Panics
        ///
        /// Panics if the clock mutex is poisoned, which only happens if a
        /// previous test thread panicked while advancing it.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
        pub fn advance_secs(&self, secs: i64) {
            let mut time = self.time.lock().unwrap();
            *time += Duration::seconds(secs);
        }
    }

    impl Clock for FixedClock {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC).
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a compact tracing subscriber for a test binary.
///
/// Safe to call from multiple tests; only the first call wins.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
pub use probes::{await_state, EffectProbe};
pub use transition_test::TransitionTest;
