//! Error taxonomy for the use-case layer.
//!
//! Use cases never panic and never propagate an error past their own
//! boundary as anything other than these variants. The dispatcher converts
//! them into one-shot `Error` notifications; they are never fatal.

use crate::todo::TodoId;
use thiserror::Error;

/// Errors produced by the use-case layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Input failed a structural constraint (title length, non-positive id).
    #[error("Validation failed: {reason}")]
    Validation {
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The referenced id has no live entity.
    #[error("Todo with ID {id} not found")]
    NotFound {
        /// The id that had no live entity.
        id: TodoId,
    },
}

impl TodoError {
    /// Create a validation error from any displayable reason.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a not-found error for the given id.
    #[must_use]
    pub const fn not_found(id: TodoId) -> Self {
        Self::NotFound { id }
    }
}
