//! The to-do entity and its invariants.
//!
//! This module defines strong types for to-do identification ([`TodoId`]),
//! the entity itself ([`Todo`]), and the list filter ([`Filter`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum title length in characters, counted after trimming.
pub const TITLE_MIN_CHARS: usize = 2;

/// Maximum title length in characters, counted after trimming.
pub const TITLE_MAX_CHARS: usize = 100;

/// Unique identifier for a to-do entity.
///
/// Ids are assigned by the repository from a monotonic counter starting at 1
/// and are never reused, even after the entity is deleted. A value of zero or
/// below never identifies a live entity.
///
/// # Design
///
/// `TodoId` is a newtype wrapper around `i64` that provides:
/// - Type safety (can't accidentally use a plain integer)
/// - Clear intent in function signatures
/// - Serialization support
///
/// # Examples
///
/// ```
/// use todoflow_core::todo::TodoId;
///
/// let id = TodoId::new(42);
/// assert_eq!(id.value(), 42);
/// assert!(id.is_assigned());
/// assert!(!TodoId::UNASSIGNED.is_assigned());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TodoId(i64);

impl TodoId {
    /// Placeholder id for an entity that has not been stored yet.
    ///
    /// The repository replaces it with the next counter value on `add`.
    pub const UNASSIGNED: Self = Self(0);

    /// Create a new `TodoId` with the given value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Whether this id could identify a stored entity (strictly positive).
    ///
    /// # Examples
    ///
    /// ```
    /// use todoflow_core::todo::TodoId;
    ///
    /// assert!(TodoId::new(1).is_assigned());
    /// assert!(!TodoId::new(0).is_assigned());
    /// assert!(!TodoId::new(-3).is_assigned());
    /// ```
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TodoId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<TodoId> for i64 {
    fn from(id: TodoId) -> Self {
        id.0
    }
}

/// A single to-do entity.
///
/// `id` and `created_at` are immutable after creation; `created_at` is used
/// only for ordering. Toggling produces a full replacement value rather than
/// mutating in place, so snapshots stay consistent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, assigned by the repository.
    pub id: TodoId,
    /// Title, 2 to 100 characters after trimming.
    pub title: String,
    /// Free-form description, may be empty.
    pub description: String,
    /// Whether the to-do is completed.
    pub completed: bool,
    /// When the to-do was created.
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Create a new, not-yet-stored to-do.
    ///
    /// The id starts out as [`TodoId::UNASSIGNED`]; the repository assigns
    /// the real id when the entity is added.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use todoflow_core::todo::{Todo, TodoId};
    ///
    /// let todo = Todo::new("Buy milk", "2 liters", Utc::now());
    /// assert_eq!(todo.id, TodoId::UNASSIGNED);
    /// assert!(!todo.completed);
    /// ```
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TodoId::UNASSIGNED,
            title: title.into(),
            description: description.into(),
            completed: false,
            created_at,
        }
    }

    /// A copy of this to-do with `completed` flipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use todoflow_core::todo::Todo;
    ///
    /// let todo = Todo::new("Buy milk", "", Utc::now());
    /// assert!(todo.toggled().completed);
    /// assert_eq!(todo.toggled().toggled(), todo);
    /// ```
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// A copy of this to-do with the given id.
    #[must_use]
    pub fn with_id(&self, id: TodoId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// List filter for projecting the repository's contents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Keep every to-do.
    #[default]
    All,
    /// Keep only to-dos with `completed == false`.
    IncompleteOnly,
}

impl Filter {
    /// The other filter variant.
    ///
    /// # Examples
    ///
    /// ```
    /// use todoflow_core::todo::Filter;
    ///
    /// assert_eq!(Filter::All.toggled(), Filter::IncompleteOnly);
    /// assert_eq!(Filter::IncompleteOnly.toggled(), Filter::All);
    /// ```
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::All => Self::IncompleteOnly,
            Self::IncompleteOnly => Self::All,
        }
    }

    /// Whether a to-do passes this filter.
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::IncompleteOnly => !todo.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod todo_id_tests {
        use super::*;

        #[test]
        fn new_and_value() {
            let id = TodoId::new(7);
            assert_eq!(id.value(), 7);
        }

        #[test]
        fn unassigned_is_not_assigned() {
            assert!(!TodoId::UNASSIGNED.is_assigned());
            assert!(!TodoId::new(-1).is_assigned());
            assert!(TodoId::new(1).is_assigned());
        }

        #[test]
        fn ordering_follows_value() {
            assert!(TodoId::new(1) < TodoId::new(2));
            assert!(TodoId::new(10) > TodoId::new(2));
        }

        #[test]
        fn display() {
            assert_eq!(format!("{}", TodoId::new(42)), "42");
        }

        #[test]
        fn from_i64_round_trip() {
            let id = TodoId::from(5_i64);
            assert_eq!(i64::from(id), 5);
        }
    }

    mod todo_tests {
        use super::*;

        #[test]
        fn new_defaults() {
            let now = Utc::now();
            let todo = Todo::new("Buy milk", "2 liters", now);

            assert_eq!(todo.id, TodoId::UNASSIGNED);
            assert_eq!(todo.title, "Buy milk");
            assert_eq!(todo.description, "2 liters");
            assert!(!todo.completed);
            assert_eq!(todo.created_at, now);
        }

        #[test]
        fn toggled_flips_completed_only() {
            let todo = Todo::new("Buy milk", "", Utc::now()).with_id(TodoId::new(3));
            let flipped = todo.toggled();

            assert!(flipped.completed);
            assert_eq!(flipped.id, todo.id);
            assert_eq!(flipped.title, todo.title);
            assert_eq!(flipped.created_at, todo.created_at);
        }

        #[test]
        fn toggled_is_an_involution() {
            let todo = Todo::new("Buy milk", "", Utc::now());
            assert_eq!(todo.toggled().toggled(), todo);
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn toggled_flips_between_variants() {
            assert_eq!(Filter::All.toggled(), Filter::IncompleteOnly);
            assert_eq!(Filter::IncompleteOnly.toggled(), Filter::All);
        }

        #[test]
        fn all_matches_everything() {
            let open = Todo::new("a b", "", Utc::now());
            let done = open.toggled();

            assert!(Filter::All.matches(&open));
            assert!(Filter::All.matches(&done));
        }

        #[test]
        fn incomplete_only_rejects_completed() {
            let open = Todo::new("a b", "", Utc::now());
            let done = open.toggled();

            assert!(Filter::IncompleteOnly.matches(&open));
            assert!(!Filter::IncompleteOnly.matches(&done));
        }
    }
}
