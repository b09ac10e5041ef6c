//! # Todoflow Runtime
//!
//! The state/event/effect dispatcher for the todoflow state core.
//!
//! This crate provides the [`dispatcher::Dispatcher`]: the single owner of
//! the observable [`state::UiState`], serializing incoming
//! [`event::TodoEvent`]s, invoking use cases, publishing new state snapshots
//! to observers, and emitting one-shot [`state::UiEffect`] notifications for
//! terminal outcomes.
//!
//! ## Core Components
//!
//! - **Transition**: a pure function `(state, event) -> (new state, optional
//!   command, optional effect)`
//! - **Dispatcher**: the actor-style loop that applies transitions in
//!   submission order and runs commands as spawned tasks that feed their
//!   outcome back as events
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todoflow_core::repository::TodoRepository;
//! use todoflow_runtime::dispatcher::Dispatcher;
//! use todoflow_runtime::event::TodoEvent;
//!
//! let dispatcher = Dispatcher::new(Arc::new(TodoRepository::new()));
//!
//! let mut state = dispatcher.state();
//! let mut effects = dispatcher.effects();
//!
//! dispatcher.submit(TodoEvent::TitleChanged("Buy milk".into()))?;
//! dispatcher.submit(TodoEvent::AddRequested)?;
//! ```

pub mod dispatcher;
pub mod event;
pub mod state;

/// Error types for the dispatcher runtime.
pub mod error {
    use thiserror::Error;

    /// Errors that can occur when submitting events to the dispatcher.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum DispatcherError {
        /// Dispatcher is shutting down and not accepting new events.
        #[error("Dispatcher is shutting down")]
        ShutdownInProgress,

        /// The event channel closed, typically because the loop task ended.
        #[error("Event channel closed")]
        ChannelClosed,
    }
}

/// Configuration for the dispatcher.
pub mod config {
    /// Tunable dispatcher settings.
    ///
    /// # Example
    ///
    /// ```
    /// use todoflow_runtime::config::DispatcherConfig;
    ///
    /// let config = DispatcherConfig::default().with_effect_capacity(64);
    /// ```
    #[derive(Debug, Clone)]
    pub struct DispatcherConfig {
        /// Capacity of the one-shot effect broadcast channel.
        ///
        /// Effects are transient notifications; a lagging listener skips
        /// old ones rather than stalling the dispatcher.
        pub effect_capacity: usize,
    }

    impl DispatcherConfig {
        /// Create a config with default settings (effect capacity 16).
        #[must_use]
        pub const fn new() -> Self {
            Self {
                effect_capacity: 16,
            }
        }

        /// Set the effect broadcast capacity.
        #[must_use]
        pub const fn with_effect_capacity(mut self, capacity: usize) -> Self {
            self.effect_capacity = capacity;
            self
        }
    }

    impl Default for DispatcherConfig {
        fn default() -> Self {
            Self::new()
        }
    }

}
