//! Concurrency-safe, observable repository of to-do entities.
//!
//! The repository is the only mutable shared state in the system. It holds
//! the authoritative id-to-entity mapping and publishes every change as a new
//! immutable [`TodoSnapshot`] to all current and future observers. This is a
//! continuously-updating broadcast of "current state", not a queue of
//! discrete edits: a late subscriber receives the current snapshot first
//! (replay depth 1), never historical ones, and a slow subscriber may observe
//! coalesced intermediate snapshots but always converges on the final value.
//!
//! # Concurrency
//!
//! A single async mutex guards the whole read-compute-publish critical
//! section, so id allocation is atomic and two concurrent `add` calls never
//! receive the same id or silently overwrite one another. Readers never hold
//! a reference into the repository's internals; they only ever see
//! [`TodoSnapshot`] values.

use crate::todo::{Todo, TodoId};
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Stream of repository snapshots from [`TodoRepository::observe`].
pub type SnapshotStream = Pin<Box<dyn Stream<Item = TodoSnapshot> + Send>>;

/// Stream of a single entity's lifetime from [`TodoRepository::observe_todo`].
pub type TodoStream = Pin<Box<dyn Stream<Item = Option<Todo>> + Send>>;

/// An immutable, point-in-time view of the id-to-entity mapping.
///
/// Snapshots are cheaply clonable (`Arc`-backed) and remain valid after the
/// repository has moved on; in-flight readers are never invalidated.
///
/// # Examples
///
/// ```ignore
/// let snapshot = repository.snapshot();
/// if let Some(todo) = snapshot.get(id) {
///     println!("{}", todo.title);
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct TodoSnapshot(Arc<HashMap<TodoId, Todo>>);

impl TodoSnapshot {
    /// Look up an entity by id.
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.0.get(&id)
    }

    /// Whether an entity with this id is live in the snapshot.
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.0.contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entities in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.0.values()
    }

    /// Collect the entities into a vector, in unspecified order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Todo> {
        self.0.values().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a TodoSnapshot {
    type Item = &'a Todo;
    type IntoIter = std::collections::hash_map::Values<'a, TodoId, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

/// Mutable internals, only ever touched under the repository mutex.
struct Inner {
    todos: HashMap<TodoId, Todo>,
    next_id: i64,
}

/// The authoritative, observable store of to-do entities.
///
/// None of the repository's operations fail under normal conditions (there
/// is no I/O); a structurally valid but unknown id simply produces empty
/// results downstream.
///
/// # Examples
///
/// ```ignore
/// use todoflow_core::repository::TodoRepository;
///
/// let repository = TodoRepository::new();
/// let id = repository.add(Todo::new("Buy milk", "", Utc::now())).await;
/// assert!(repository.snapshot().contains(id));
/// ```
pub struct TodoRepository {
    inner: Mutex<Inner>,
    snapshots: watch::Sender<TodoSnapshot>,
}

impl TodoRepository {
    /// Create an empty repository. The first assigned id is 1.
    #[must_use]
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(TodoSnapshot::default());

        Self {
            inner: Mutex::new(Inner {
                todos: HashMap::new(),
                next_id: 1,
            }),
            snapshots,
        }
    }

    /// The current snapshot, as a single value.
    ///
    /// Use [`observe`](Self::observe) for a live subscription instead.
    #[must_use]
    pub fn snapshot(&self) -> TodoSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to the live snapshot stream.
    ///
    /// The stream immediately yields the current snapshot and thereafter
    /// yields a new snapshot after every mutation, in the order mutations
    /// were applied. Adjacent snapshots may be coalesced for a slow
    /// consumer; the final value is always delivered. The stream ends only
    /// when the repository is dropped; dropping the stream cancels delivery
    /// without affecting the repository's data.
    #[must_use]
    pub fn observe(&self) -> SnapshotStream {
        let mut rx = self.snapshots.subscribe();

        Box::pin(stream! {
            let current = rx.borrow_and_update().clone();
            yield current;

            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                yield next;
            }
        })
    }

    /// Subscribe to a single entity, projected from the snapshot stream.
    ///
    /// Yields `Some(todo)` while the id is live and `None` once it no longer
    /// exists (or never did).
    #[must_use]
    pub fn observe_todo(&self, id: TodoId) -> TodoStream {
        Box::pin(
            self.observe()
                .map(move |snapshot| snapshot.get(id).cloned()),
        )
    }

    /// Store a new entity and return its freshly assigned id.
    ///
    /// The caller-supplied id is ignored; the repository assigns the next
    /// value of its monotonic counter. Ids are never reused, even after
    /// deletion.
    pub async fn add(&self, todo: Todo) -> TodoId {
        let mut inner = self.inner.lock().await;

        let id = TodoId::new(inner.next_id);
        inner.next_id += 1;
        inner.todos.insert(id, todo.with_id(id));

        self.publish(&inner);
        id
    }

    /// Replace the entity at `todo.id` wholesale.
    ///
    /// If no entity with that id exists the record is inserted (upsert
    /// semantics); the id counter is not consulted.
    pub async fn update(&self, todo: Todo) {
        let mut inner = self.inner.lock().await;
        inner.todos.insert(todo.id, todo);
        self.publish(&inner);
    }

    /// Remove the entity with the given id.
    ///
    /// Removing an absent id is a no-op, not an error; no snapshot is
    /// published in that case.
    pub async fn delete(&self, id: TodoId) {
        let mut inner = self.inner.lock().await;

        if inner.todos.remove(&id).is_some() {
            self.publish(&inner);
        }
    }

    /// Publish a new snapshot. Must be called with the lock held so
    /// snapshots go out in mutation order.
    fn publish(&self, inner: &Inner) {
        let snapshot = TodoSnapshot(Arc::new(inner.todos.clone()));
        self.snapshots.send_replace(snapshot);
    }
}

impl Default for TodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoRepository")
            .field("len", &self.snapshots.borrow().len())
            .finish_non_exhaustive()
    }
}
