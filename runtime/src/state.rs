//! Observable UI state and one-shot effects.

use serde::{Deserialize, Serialize};
use todoflow_core::todo::{Filter, Todo};

/// The dispatcher-owned UI state.
///
/// `todos` is derived from the repository through the standing list
/// subscription; it is never written directly by mutating events. The
/// dispatcher replaces the whole value on every transition, so observers
/// always see a consistent snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Current list, most-recently-created first.
    pub todos: Vec<Todo>,
    /// True while the list subscription has not yet delivered.
    pub is_loading: bool,
    /// Active list filter.
    pub filter: Filter,
    /// Transient title input, UI-only memory.
    pub title_input: String,
    /// Transient description input, UI-only memory.
    pub description_input: String,
}

impl UiState {
    /// The state the dispatcher starts from: loading, no todos, default
    /// filter, empty inputs.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            todos: Vec::new(),
            is_loading: true,
            filter: Filter::default(),
            title_input: String::new(),
            description_input: String::new(),
        }
    }

    /// Total number of listed todos.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.todos.len()
    }

    /// Number of listed todos with `completed == true`.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Number of listed todos with `completed == false`.
    #[must_use]
    pub fn incomplete_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::initial()
    }
}

/// A one-shot notification, distinct from persistent state.
///
/// Effects are delivered only to listeners attached at emission time; with
/// no listener attached they are dropped. This fire-and-forget behavior is
/// deliberate: effects model transient notifications, not state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEffect {
    /// A to-do was added successfully.
    Added,
    /// An operation failed; carries a human-readable message.
    Error(String),
}
