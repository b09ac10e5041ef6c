//! The closed set of events the dispatcher processes.
//!
//! Intents arrive from external callers via `submit`; feedback events are
//! produced only by the dispatcher's own tasks (command completions and the
//! standing list subscription) and travel through the same serialized loop.

use todoflow_core::error::TodoError;
use todoflow_core::todo::{Todo, TodoId};

/// Events accepted by the dispatcher.
///
/// Deliberately not serializable: events are in-process values produced by
/// the UI collaborator or the dispatcher itself, never a wire format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoEvent {
    // ========== Intents ==========
    /// The title input changed.
    TitleChanged(String),

    /// The description input changed.
    DescriptionChanged(String),

    /// Add a to-do from the current inputs.
    AddRequested,

    /// Flip the `completed` flag of the given to-do.
    ToggleRequested(TodoId),

    /// Delete the given to-do.
    DeleteRequested(TodoId),

    /// Flip the list filter and resubscribe.
    FilterToggled,

    // ========== Feedback ==========
    /// The standing list subscription delivered a fresh list.
    TodosLoaded(Vec<Todo>),

    /// An add command finished.
    AddCompleted(Result<TodoId, TodoError>),

    /// A toggle command finished.
    ToggleCompleted(Result<bool, TodoError>),

    /// A delete command finished.
    DeleteCompleted(Result<(), TodoError>),
}

impl TodoEvent {
    /// Whether this event is an external intent.
    #[must_use]
    pub const fn is_intent(&self) -> bool {
        matches!(
            self,
            Self::TitleChanged(_)
                | Self::DescriptionChanged(_)
                | Self::AddRequested
                | Self::ToggleRequested(_)
                | Self::DeleteRequested(_)
                | Self::FilterToggled
        )
    }

    /// Whether this event is feedback from the dispatcher's own tasks.
    #[must_use]
    pub const fn is_feedback(&self) -> bool {
        !self.is_intent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_are_not_feedback() {
        let event = TodoEvent::AddRequested;
        assert!(event.is_intent());
        assert!(!event.is_feedback());
    }

    #[test]
    fn feedback_is_not_an_intent() {
        let event = TodoEvent::TodosLoaded(Vec::new());
        assert!(event.is_feedback());
        assert!(!event.is_intent());

        let event = TodoEvent::AddCompleted(Ok(TodoId::new(1)));
        assert!(event.is_feedback());
    }
}
