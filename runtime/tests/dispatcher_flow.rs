//! End-to-end flows through the dispatcher: events in, state snapshots and
//! one-shot effects out, with the repository as the single source of truth.

#![allow(clippy::unwrap_used)] // Panics: test will fail if a value is missing
#![allow(clippy::panic)] // Test assertions

use std::sync::Arc;
use std::time::Duration;
use todoflow_core::repository::TodoRepository;
use todoflow_core::todo::{Filter, TodoId};
use todoflow_runtime::config::DispatcherConfig;
use todoflow_runtime::dispatcher::Dispatcher;
use todoflow_runtime::error::DispatcherError;
use todoflow_runtime::event::TodoEvent;
use todoflow_runtime::state::UiEffect;
use todoflow_testing::{await_state, init_tracing, test_clock, EffectProbe};

fn fixture() -> (Arc<TodoRepository>, Dispatcher) {
    init_tracing();

    let repository = Arc::new(TodoRepository::new());
    let dispatcher = Dispatcher::with_config(
        Arc::clone(&repository),
        Arc::new(test_clock()),
        DispatcherConfig::default(),
    );

    (repository, dispatcher)
}

/// Drive one add through input events and wait for it to land in state.
fn submit_add(dispatcher: &Dispatcher, title: &str, description: &str) {
    dispatcher
        .submit(TodoEvent::TitleChanged(title.into()))
        .unwrap();
    dispatcher
        .submit(TodoEvent::DescriptionChanged(description.into()))
        .unwrap();
    dispatcher.submit(TodoEvent::AddRequested).unwrap();
}

#[tokio::test]
async fn initial_subscription_clears_loading() {
    let (_repository, dispatcher) = fixture();
    let mut state = dispatcher.state();

    let loaded = await_state(&mut state, |s| !s.is_loading).await;

    assert!(loaded.todos.is_empty());
    assert_eq!(loaded.filter, Filter::All);
}

#[tokio::test]
async fn add_flow_updates_state_and_emits_added_once() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();
    let mut effects = EffectProbe::new(dispatcher.effects());

    submit_add(&dispatcher, "장보기", "우유, 빵");

    assert_eq!(effects.next().await, UiEffect::Added);
    effects.expect_silence(Duration::from_millis(100)).await;

    let loaded = await_state(&mut state, |s| s.total_count() == 1).await;
    assert_eq!(loaded.todos[0].title, "장보기");
    assert_eq!(loaded.todos[0].description, "우유, 빵");
    assert!(loaded.title_input.is_empty(), "inputs clear on success");
    assert!(loaded.description_input.is_empty());

    assert_eq!(repository.snapshot().len(), 1);
}

#[tokio::test]
async fn invalid_add_emits_error_once_and_touches_nothing() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();
    let mut effects = EffectProbe::new(dispatcher.effects());

    // One character after trimming: below the two-character minimum.
    submit_add(&dispatcher, "가", "");

    match effects.next().await {
        UiEffect::Error(message) => assert!(message.contains("at least")),
        other => panic!("expected an Error effect, got {other:?}"),
    }
    effects.expect_silence(Duration::from_millis(100)).await;

    assert_eq!(repository.snapshot().len(), 0, "zero side effects");

    let current = await_state(&mut state, |s| !s.is_loading).await;
    assert!(current.todos.is_empty());
    assert_eq!(current.title_input, "가", "inputs survive a failed add");
}

#[tokio::test]
async fn list_is_most_recently_created_first() {
    let (_repository, dispatcher) = fixture();
    let mut state = dispatcher.state();
    let mut effects = EffectProbe::new(dispatcher.effects());

    submit_add(&dispatcher, "장보기", "우유, 빵");
    assert_eq!(effects.next().await, UiEffect::Added);
    submit_add(&dispatcher, "운동하기", "");
    assert_eq!(effects.next().await, UiEffect::Added);

    let loaded = await_state(&mut state, |s| s.total_count() == 2).await;
    assert_eq!(loaded.todos[0].title, "운동하기");
    assert_eq!(loaded.todos[1].title, "장보기");
}

#[tokio::test]
async fn toggle_refreshes_state_through_the_stream() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();

    submit_add(&dispatcher, "장보기", "");
    await_state(&mut state, |s| s.total_count() == 1).await;
    let id = repository.snapshot().to_vec()[0].id;

    dispatcher.submit(TodoEvent::ToggleRequested(id)).unwrap();
    let toggled = await_state(&mut state, |s| s.completed_count() == 1).await;
    assert_eq!(toggled.total_count(), 1);

    dispatcher.submit(TodoEvent::ToggleRequested(id)).unwrap();
    await_state(&mut state, |s| s.completed_count() == 0).await;
}

#[tokio::test]
async fn toggle_of_unknown_id_surfaces_error_effect() {
    let (repository, dispatcher) = fixture();
    let mut effects = EffectProbe::new(dispatcher.effects());

    dispatcher
        .submit(TodoEvent::ToggleRequested(TodoId::new(99)))
        .unwrap();

    match effects.next().await {
        UiEffect::Error(message) => assert!(message.contains("not found")),
        other => panic!("expected an Error effect, got {other:?}"),
    }
    assert!(repository.snapshot().is_empty());
}

#[tokio::test]
async fn delete_of_unknown_id_is_silent() {
    let (_repository, dispatcher) = fixture();
    let mut effects = EffectProbe::new(dispatcher.effects());

    dispatcher
        .submit(TodoEvent::DeleteRequested(TodoId::new(99)))
        .unwrap();

    // Lenient by design: no error, no notification.
    effects.expect_silence(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn filter_toggle_resubscribes_with_the_new_filter() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();
    let mut effects = EffectProbe::new(dispatcher.effects());

    submit_add(&dispatcher, "장보기", "우유, 빵");
    assert_eq!(effects.next().await, UiEffect::Added);
    submit_add(&dispatcher, "운동하기", "");
    assert_eq!(effects.next().await, UiEffect::Added);

    await_state(&mut state, |s| s.total_count() == 2).await;
    let groceries = repository
        .snapshot()
        .to_vec()
        .into_iter()
        .find(|t| t.title == "장보기")
        .unwrap()
        .id;

    dispatcher.submit(TodoEvent::ToggleRequested(groceries)).unwrap();
    await_state(&mut state, |s| s.completed_count() == 1).await;

    dispatcher.submit(TodoEvent::FilterToggled).unwrap();
    let filtered = await_state(&mut state, |s| {
        s.filter == Filter::IncompleteOnly && !s.is_loading && s.total_count() == 1
    })
    .await;
    assert_eq!(filtered.todos[0].title, "운동하기");

    dispatcher.submit(TodoEvent::FilterToggled).unwrap();
    await_state(&mut state, |s| s.filter == Filter::All && s.total_count() == 2).await;
}

#[tokio::test]
async fn scenario_add_toggle_delete_end_to_end() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();
    let mut effects = EffectProbe::new(dispatcher.effects());

    submit_add(&dispatcher, "장보기", "우유, 빵");
    assert_eq!(effects.next().await, UiEffect::Added);
    submit_add(&dispatcher, "운동하기", "");
    assert_eq!(effects.next().await, UiEffect::Added);

    let both = await_state(&mut state, |s| s.total_count() == 2).await;
    assert_eq!(both.todos[0].title, "운동하기");

    let groceries = repository
        .snapshot()
        .to_vec()
        .into_iter()
        .find(|t| t.title == "장보기")
        .unwrap()
        .id;

    dispatcher.submit(TodoEvent::ToggleRequested(groceries)).unwrap();
    await_state(&mut state, |s| s.completed_count() == 1).await;

    dispatcher.submit(TodoEvent::DeleteRequested(groceries)).unwrap();
    let after_delete = await_state(&mut state, |s| s.total_count() == 1).await;
    assert_eq!(after_delete.todos[0].title, "운동하기");
    assert_eq!(after_delete.incomplete_count(), 1);
}

#[tokio::test]
async fn effects_without_listeners_are_dropped_not_fatal() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();

    // No effects receiver attached at all.
    submit_add(&dispatcher, "장보기", "");
    await_state(&mut state, |s| s.total_count() == 1).await;

    // A listener attached afterwards sees nothing old.
    let mut effects = EffectProbe::new(dispatcher.effects());
    effects.expect_silence(Duration::from_millis(100)).await;

    assert_eq!(repository.snapshot().len(), 1);
}

#[tokio::test]
async fn state_stream_replays_current_snapshot_first() {
    let (_repository, dispatcher) = fixture();
    let mut state = dispatcher.state();

    submit_add(&dispatcher, "장보기", "");
    await_state(&mut state, |s| s.total_count() == 1).await;

    use futures::StreamExt;
    let mut stream = dispatcher.state_stream();
    let first = stream.next().await.unwrap();
    assert_eq!(first.total_count(), 1);
}

#[tokio::test]
async fn shutdown_rejects_further_events() {
    let (_repository, dispatcher) = fixture();

    dispatcher.shutdown();

    assert_eq!(
        dispatcher.submit(TodoEvent::AddRequested),
        Err(DispatcherError::ShutdownInProgress)
    );
}

#[tokio::test]
async fn dropping_the_dispatcher_leaves_repository_data_intact() {
    let (repository, dispatcher) = fixture();
    let mut state = dispatcher.state();

    submit_add(&dispatcher, "장보기", "");
    await_state(&mut state, |s| s.total_count() == 1).await;

    drop(dispatcher);

    assert_eq!(repository.snapshot().len(), 1);
}
