//! Business operations over the repository.
//!
//! Each use case is a stateless function of the repository: it validates its
//! input, calls the repository, and translates the outcome into an explicit
//! `Result`. None of them hold mutable state of their own, and none of them
//! touch the repository when validation fails.

use crate::clock::Clock;
use crate::error::TodoError;
use crate::repository::TodoRepository;
use crate::todo::{Filter, Todo, TodoId, TITLE_MAX_CHARS, TITLE_MIN_CHARS};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Stream of filtered, sorted to-do lists from [`ListTodos::stream`].
pub type TodoListStream = Pin<Box<dyn Stream<Item = Vec<Todo>> + Send>>;

/// Validates a title against the 2-100 character bound, counted after
/// trimming. Characters are counted as `char`s so multi-byte scripts are
/// measured the way a user would count them.
fn validate_title(title: &str) -> Result<(), TodoError> {
    let chars = title.trim().chars().count();

    if chars < TITLE_MIN_CHARS {
        return Err(TodoError::validation(format!(
            "title must be at least {TITLE_MIN_CHARS} characters after trimming, got {chars}"
        )));
    }

    if chars > TITLE_MAX_CHARS {
        return Err(TodoError::validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters after trimming, got {chars}"
        )));
    }

    Ok(())
}

/// Projects the repository's observable stream into a filtered, sorted list.
///
/// The stream mirrors every repository change for the lifetime of the
/// subscription and never terminates on its own; resubscribing replays the
/// current filtered and sorted view first.
#[derive(Clone)]
pub struct ListTodos {
    repository: Arc<TodoRepository>,
}

impl ListTodos {
    /// Create the use case over the given repository.
    #[must_use]
    pub fn new(repository: Arc<TodoRepository>) -> Self {
        Self { repository }
    }

    /// Subscribe to the live, filtered, sorted list.
    ///
    /// Entries are sorted by `created_at` descending. Ties are broken by id
    /// descending: ids encode insertion order, so two entries created in the
    /// same instant still read most-recent-first.
    #[must_use]
    pub fn stream(&self, filter: Filter) -> TodoListStream {
        Box::pin(self.repository.observe().map(move |snapshot| {
            let mut todos: Vec<Todo> = snapshot
                .iter()
                .filter(|todo| filter.matches(todo))
                .cloned()
                .collect();

            todos.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });

            todos
        }))
    }
}

/// Creates a new to-do after validating the title.
///
/// On a validation failure the repository is not called at all; invalid
/// input has zero side effects.
#[derive(Clone)]
pub struct AddTodo {
    repository: Arc<TodoRepository>,
    clock: Arc<dyn Clock>,
}

impl AddTodo {
    /// Create the use case over the given repository and clock.
    #[must_use]
    pub fn new(repository: Arc<TodoRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Validate, trim, store, and return the freshly assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] when the trimmed title is shorter
    /// than 2 or longer than 100 characters.
    pub async fn execute(&self, title: &str, description: &str) -> Result<TodoId, TodoError> {
        validate_title(title)?;

        let todo = Todo::new(title.trim(), description.trim(), self.clock.now());
        Ok(self.repository.add(todo).await)
    }
}

/// Flips the `completed` flag of an existing to-do.
///
/// Unlike [`DeleteTodo`], toggling is strict: a missing id is an error.
#[derive(Clone)]
pub struct ToggleTodo {
    repository: Arc<TodoRepository>,
}

impl ToggleTodo {
    /// Create the use case over the given repository.
    #[must_use]
    pub fn new(repository: Arc<TodoRepository>) -> Self {
        Self { repository }
    }

    /// Read the current entity, persist the flipped record wholesale, and
    /// return the new `completed` value.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] when the id has no live entity.
    pub async fn execute(&self, id: TodoId) -> Result<bool, TodoError> {
        let current = self
            .repository
            .snapshot()
            .get(id)
            .cloned()
            .ok_or(TodoError::not_found(id))?;

        let updated = current.toggled();
        let completed = updated.completed;
        self.repository.update(updated).await;

        Ok(completed)
    }
}

/// Removes a to-do by id.
///
/// Deliberately lenient: deleting an id that does not currently exist
/// succeeds as a no-op. Only structurally invalid (non-positive) ids are
/// rejected.
#[derive(Clone)]
pub struct DeleteTodo {
    repository: Arc<TodoRepository>,
}

impl DeleteTodo {
    /// Create the use case over the given repository.
    #[must_use]
    pub fn new(repository: Arc<TodoRepository>) -> Self {
        Self { repository }
    }

    /// Delete the entity if present.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] when `id` is not strictly positive.
    pub async fn execute(&self, id: TodoId) -> Result<(), TodoError> {
        if !id.is_assigned() {
            return Err(TodoError::validation(format!(
                "todo id must be positive, got {id}"
            )));
        }

        self.repository.delete(id).await;
        Ok(())
    }
}
