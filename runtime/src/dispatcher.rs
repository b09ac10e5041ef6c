//! The state/effect dispatcher.
//!
//! The dispatcher is the only owner of [`UiState`]. Events enter through
//! [`Dispatcher::submit`], are applied one at a time by a single loop task
//! (so mutations serialize), and every transition publishes a complete new
//! state value to all watchers. Terminal outcomes additionally surface as
//! one-shot [`UiEffect`] notifications on a broadcast channel with no
//! replay.
//!
//! Transitions themselves are pure: [`transition`] maps `(state, event)` to
//! a new state plus an optional [`Command`] and an optional effect. The loop
//! executes commands in spawned tasks; each command feeds its outcome back
//! into the loop as a feedback event, closing the unidirectional cycle.

use crate::config::DispatcherConfig;
use crate::error::DispatcherError;
use crate::event::TodoEvent;
use crate::state::{UiEffect, UiState};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use todoflow_core::clock::{Clock, SystemClock};
use todoflow_core::repository::TodoRepository;
use todoflow_core::todo::{Filter, TodoId};
use todoflow_core::usecases::{AddTodo, DeleteTodo, ListTodos, ToggleTodo};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Stream of UI state snapshots, replay depth 1.
pub type UiStateStream = Pin<Box<dyn Stream<Item = UiState> + Send>>;

/// A side effect requested by a transition, executed by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the add use case with the captured inputs.
    RunAdd {
        /// Title input at the time of the request.
        title: String,
        /// Description input at the time of the request.
        description: String,
    },
    /// Run the toggle use case.
    RunToggle(TodoId),
    /// Run the delete use case.
    RunDelete(TodoId),
    /// Replace the standing list subscription with one for this filter.
    Resubscribe(Filter),
}

/// Result of applying one event to the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The complete replacement state.
    pub state: UiState,
    /// Command for the runtime to execute, if any.
    pub command: Option<Command>,
    /// One-shot notification to emit, if any.
    pub effect: Option<UiEffect>,
}

impl Transition {
    fn state_only(state: UiState) -> Self {
        Self {
            state,
            command: None,
            effect: None,
        }
    }
}

/// The pure transition function.
///
/// Input-editing events complete synchronously with no command. Mutating
/// intents capture what they need from the state and defer the actual work
/// to a [`Command`]; the matching `*Completed` feedback event then applies
/// the outcome. `todos` is only ever written by [`TodoEvent::TodosLoaded`] —
/// mutating events rely on the standing list subscription to reflect their
/// change back into state.
#[must_use]
pub fn transition(state: &UiState, event: TodoEvent) -> Transition {
    match event {
        TodoEvent::TitleChanged(title) => Transition::state_only(UiState {
            title_input: title,
            ..state.clone()
        }),

        TodoEvent::DescriptionChanged(description) => Transition::state_only(UiState {
            description_input: description,
            ..state.clone()
        }),

        TodoEvent::AddRequested => Transition {
            state: state.clone(),
            command: Some(Command::RunAdd {
                title: state.title_input.clone(),
                description: state.description_input.clone(),
            }),
            effect: None,
        },

        TodoEvent::AddCompleted(Ok(_)) => Transition {
            state: UiState {
                title_input: String::new(),
                description_input: String::new(),
                ..state.clone()
            },
            command: None,
            effect: Some(UiEffect::Added),
        },

        TodoEvent::ToggleRequested(id) => Transition {
            state: state.clone(),
            command: Some(Command::RunToggle(id)),
            effect: None,
        },

        TodoEvent::DeleteRequested(id) => Transition {
            state: state.clone(),
            command: Some(Command::RunDelete(id)),
            effect: None,
        },

        TodoEvent::FilterToggled => {
            let filter = state.filter.toggled();
            Transition {
                state: UiState {
                    filter,
                    is_loading: true,
                    ..state.clone()
                },
                command: Some(Command::Resubscribe(filter)),
                effect: None,
            }
        }

        TodoEvent::TodosLoaded(todos) => Transition::state_only(UiState {
            todos,
            is_loading: false,
            ..state.clone()
        }),

        // Successful toggles and deletes reach state through the list
        // subscription, not here.
        TodoEvent::ToggleCompleted(Ok(_)) | TodoEvent::DeleteCompleted(Ok(())) => {
            Transition::state_only(state.clone())
        }

        TodoEvent::AddCompleted(Err(error))
        | TodoEvent::ToggleCompleted(Err(error))
        | TodoEvent::DeleteCompleted(Err(error)) => Transition {
            state: state.clone(),
            command: None,
            effect: Some(UiEffect::Error(error.to_string())),
        },
    }
}

/// Aborts a spawned task when dropped, so a torn-down dispatcher never
/// leaves its list subscription running.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// The single consumer of the event queue.
struct EventLoop {
    events: mpsc::UnboundedReceiver<TodoEvent>,
    feedback: mpsc::UnboundedSender<TodoEvent>,
    state: watch::Sender<UiState>,
    effects: broadcast::Sender<UiEffect>,
    add: AddTodo,
    toggle: ToggleTodo,
    delete: DeleteTodo,
    list: ListTodos,
    list_task: Option<AbortOnDrop>,
}

impl EventLoop {
    async fn run(mut self) {
        let initial_filter = self.state.borrow().filter;
        self.resubscribe(initial_filter);

        while let Some(event) = self.events.recv().await {
            self.apply(event);
        }

        tracing::debug!("Event channel closed, dispatcher loop ending");
    }

    fn apply(&mut self, event: TodoEvent) {
        tracing::trace!(?event, "Applying event");
        metrics::counter!("dispatcher.events.total").increment(1);

        let current = self.state.borrow().clone();

        let start = std::time::Instant::now();
        let Transition {
            state,
            command,
            effect,
        } = transition(&current, event);
        metrics::histogram!("dispatcher.transition.duration_seconds")
            .record(start.elapsed().as_secs_f64());

        // Wholesale replacement; watchers only wake when something changed.
        self.state.send_if_modified(|slot| {
            if *slot == state {
                false
            } else {
                *slot = state;
                true
            }
        });

        if let Some(effect) = effect {
            self.emit(effect);
        }

        if let Some(command) = command {
            self.run_command(command);
        }
    }

    /// Deliver a one-shot effect to currently attached listeners.
    ///
    /// With no listener attached the effect is dropped. That is the intended
    /// fire-and-forget semantics for transient notifications, not a bug.
    fn emit(&self, effect: UiEffect) {
        if self.effects.send(effect).is_err() {
            tracing::debug!("Effect emitted with no listener attached, dropped");
            metrics::counter!("dispatcher.effects.dropped").increment(1);
        }
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::RunAdd { title, description } => {
                let add = self.add.clone();
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    let result = add.execute(&title, &description).await;
                    let _ = feedback.send(TodoEvent::AddCompleted(result));
                });
            }

            Command::RunToggle(id) => {
                let toggle = self.toggle.clone();
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    let result = toggle.execute(id).await;
                    let _ = feedback.send(TodoEvent::ToggleCompleted(result));
                });
            }

            Command::RunDelete(id) => {
                let delete = self.delete.clone();
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    let result = delete.execute(id).await;
                    let _ = feedback.send(TodoEvent::DeleteCompleted(result));
                });
            }

            Command::Resubscribe(filter) => self.resubscribe(filter),
        }
    }

    /// Replace the standing list subscription.
    ///
    /// The old subscription is aborted first; aborting delivery never
    /// affects the repository's data.
    fn resubscribe(&mut self, filter: Filter) {
        self.list_task.take();

        tracing::debug!(?filter, "Subscribing to list stream");

        let mut stream = self.list.stream(filter);
        let feedback = self.feedback.clone();
        self.list_task = Some(AbortOnDrop(tokio::spawn(async move {
            while let Some(todos) = stream.next().await {
                if feedback.send(TodoEvent::TodosLoaded(todos)).is_err() {
                    break;
                }
            }
        })));
    }
}

/// Owner of the UI state, serializer of events, emitter of effects.
///
/// # Concurrency
///
/// `submit` enqueues without blocking; a single loop task applies events in
/// submission order, so state transitions serialize. Commands run in spawned
/// tasks and report back through feedback events, so slow use-case calls
/// never stall input editing. Use-case failures are caught and surfaced only
/// as `Error` effects; they never crash the loop or corrupt state.
///
/// # Teardown
///
/// [`shutdown`](Self::shutdown) (or dropping the dispatcher) stops the loop
/// and the standing list subscription. In-flight repository writes are
/// atomic and are not rolled back; only delivery stops.
pub struct Dispatcher {
    events: mpsc::UnboundedSender<TodoEvent>,
    state: watch::Receiver<UiState>,
    effects: broadcast::Sender<UiEffect>,
    shutdown: Arc<AtomicBool>,
    loop_task: JoinHandle<()>,
}

impl Dispatcher {
    /// Create a dispatcher over the repository with the system clock and
    /// default configuration.
    ///
    /// The dispatcher starts loading: it immediately subscribes to the list
    /// stream for the default filter, and the first `TodosLoaded` emission
    /// clears `is_loading`.
    #[must_use]
    pub fn new(repository: Arc<TodoRepository>) -> Self {
        Self::with_config(repository, Arc::new(SystemClock), DispatcherConfig::default())
    }

    /// Create a dispatcher with an explicit clock and configuration.
    #[must_use]
    pub fn with_config(
        repository: Arc<TodoRepository>,
        clock: Arc<dyn Clock>,
        config: DispatcherConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(UiState::initial());
        let (effects_tx, _) = broadcast::channel(config.effect_capacity);

        let event_loop = EventLoop {
            events: events_rx,
            feedback: events_tx.clone(),
            state: state_tx,
            effects: effects_tx.clone(),
            add: AddTodo::new(Arc::clone(&repository), clock),
            toggle: ToggleTodo::new(Arc::clone(&repository)),
            delete: DeleteTodo::new(Arc::clone(&repository)),
            list: ListTodos::new(repository),
            list_task: None,
        };

        let loop_task = tokio::spawn(event_loop.run());

        Self {
            events: events_tx,
            state: state_rx,
            effects: effects_tx,
            shutdown: Arc::new(AtomicBool::new(false)),
            loop_task,
        }
    }

    /// Submit an event for processing.
    ///
    /// Never blocks; the event is applied asynchronously, in submission
    /// order relative to other events from this caller.
    ///
    /// # Errors
    ///
    /// - [`DispatcherError::ShutdownInProgress`] after [`shutdown`](Self::shutdown)
    /// - [`DispatcherError::ChannelClosed`] if the loop task has ended
    #[tracing::instrument(skip(self, event), name = "dispatcher_submit")]
    pub fn submit(&self, event: TodoEvent) -> Result<(), DispatcherError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected event: dispatcher is shutting down");
            return Err(DispatcherError::ShutdownInProgress);
        }

        self.events
            .send(event)
            .map_err(|_| DispatcherError::ChannelClosed)
    }

    /// Subscribe to UI state snapshots.
    ///
    /// The receiver starts at the current state (replay depth 1) and wakes
    /// on every change thereafter, in transition order. Adjacent updates may
    /// coalesce for a slow watcher; the final value is always observable.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<UiState> {
        self.state.clone()
    }

    /// The current state, as a single value.
    #[must_use]
    pub fn current_state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Subscribe to UI state as a stream of snapshots.
    #[must_use]
    pub fn state_stream(&self) -> UiStateStream {
        let mut rx = self.state();

        Box::pin(async_stream::stream! {
            let current = rx.borrow_and_update().clone();
            yield current;

            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                yield next;
            }
        })
    }

    /// Subscribe to one-shot effects.
    ///
    /// No replay: only effects emitted while this receiver is attached are
    /// delivered. Effects emitted with no receiver attached are dropped.
    #[must_use]
    pub fn effects(&self) -> broadcast::Receiver<UiEffect> {
        self.effects.subscribe()
    }

    /// Stop accepting events and tear down the loop and the standing list
    /// subscription. Repository data is unaffected.
    pub fn shutdown(&self) {
        tracing::info!("Dispatcher shutting down");
        self.shutdown.store(true, Ordering::Release);
        self.loop_task.abort();
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        self.loop_task.abort();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("shutdown", &self.shutdown.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
