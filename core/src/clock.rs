//! Time abstraction for testability.
//!
//! All creation timestamps flow through the [`Clock`] trait so tests can pin
//! time to a fixed instant and ordering-sensitive assertions stay
//! deterministic.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// # Examples
///
/// ```
/// use todoflow_core::clock::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
