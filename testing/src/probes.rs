//! Async probes for observable state and one-shot effects.
//!
//! Integration tests against the dispatcher are inherently asynchronous:
//! a submitted event becomes visible in state only after the loop task and,
//! for mutating events, the standing list subscription have run. These
//! helpers wait for that with explicit timeouts so a broken dispatcher
//! fails the test instead of hanging it.

use std::time::Duration;
use tokio::sync::{broadcast, watch};
use todoflow_runtime::state::UiEffect;

/// Default wait bound for probes. Generous, so slow CI does not flake.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait until the watched value satisfies the predicate and return it.
///
/// Checks the current value first (watch channels replay the latest value),
/// then wakes on every change. Intermediate values may be coalesced; the
/// predicate is what matters.
///
/// # Panics
///
/// Panics if the channel closes or [`DEFAULT_TIMEOUT`] elapses before the
/// predicate holds.
#[allow(clippy::panic, clippy::expect_used)] // Test helper, failure should be loud
pub async fn await_state<T, F>(rx: &mut watch::Receiver<T>, mut predicate: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(DEFAULT_TIMEOUT, async {
        loop {
            let current = rx.borrow_and_update().clone();
            if predicate(&current) {
                return current;
            }

            rx.changed()
                .await
                .expect("state channel closed while waiting for predicate");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for state predicate"))
}

/// Collects one-shot effects from a broadcast subscription.
///
/// Attach the probe before submitting the event under test; effects emitted
/// before attachment are dropped by design and can never be observed.
pub struct EffectProbe {
    rx: broadcast::Receiver<UiEffect>,
}

impl EffectProbe {
    /// Wrap a broadcast receiver.
    #[must_use]
    pub const fn new(rx: broadcast::Receiver<UiEffect>) -> Self {
        Self { rx }
    }

    /// Wait for the next effect.
    ///
    /// # Panics
    ///
    /// Panics if the channel closes, the probe lagged, or
    /// [`DEFAULT_TIMEOUT`] elapses with no effect.
    #[allow(clippy::panic, clippy::expect_used)] // Test helper, failure should be loud
    pub async fn next(&mut self) -> UiEffect {
        tokio::time::timeout(DEFAULT_TIMEOUT, self.rx.recv())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for an effect"))
            .expect("effect channel closed or probe lagged")
    }

    /// Assert that no effect arrives within the given window.
    ///
    /// # Panics
    ///
    /// Panics if an effect is delivered inside the window.
    #[allow(clippy::panic)] // Test assertion
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(received) = tokio::time::timeout(window, self.rx.recv()).await {
            panic!("expected no effect, but received {received:?}");
        }
    }
}
