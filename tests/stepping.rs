//! End-to-end pause/step scenarios driven through the store and coordinator.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;

use fermata::{
    Command, Config, Coordinator, FrameId, MemoryPrefs, PauseReasonKind, PauseStore, SourceLocation,
    ThreadId,
    testing::{ClientCall, ScriptedClient, frame, point},
};

fn t(id: &str) -> ThreadId {
    ThreadId::from(id)
}

fn session(
    client: Arc<ScriptedClient>,
) -> (Coordinator<ScriptedClient>, JoinHandle<fermata::Result>) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    let (store, task) = PauseStore::spawn(t("t1"), MemoryPrefs::default(), Config::default());
    (Coordinator::new(store, client), task)
}

async fn shutdown(
    coordinator: &Coordinator<ScriptedClient>,
    task: JoinHandle<fermata::Result>,
) {
    coordinator.store().stop();
    task.await.unwrap().unwrap();
}

/// CONNECT → PAUSED with an eager top frame → full stack fetch.
#[tokio::test]
async fn test_pause_loads_stack_and_selects_top_frame() {
    let client = Arc::new(ScriptedClient::new());
    client.set_frames(vec![frame("f1", 10), frame("f2", 20)]);
    client.set_scope(frame("f1", 10), json!({ "bindings": [] }));
    let (coordinator, task) = session(client.clone());

    coordinator.connect(t("t1")).await.unwrap();
    coordinator
        .paused(
            t("t1"),
            Some(frame("f1", 10)),
            PauseReasonKind::Breakpoint.into(),
            point("100"),
        )
        .await
        .unwrap();

    let state = coordinator.store().state();
    assert!(state.is_paused(&t("t1")));
    assert!(state.thread_context().is_paused);
    assert_eq!(
        state.selected_frame_id(&t("t1")),
        Some(&FrameId::from("f1"))
    );
    assert_eq!(state.frames(&t("t1")).unwrap().len(), 2);
    assert_eq!(state.thread_execution_point(&t("t1")), Some(&point("100")));
    // Top-frame scopes were fetched lazily right after the stack.
    assert!(!state.frame_scope(&t("t1"), &FrameId::from("f1")).unwrap().pending);

    shutdown(&coordinator, task).await;
}

/// Step-over records the origin location and completes its round-trip.
#[tokio::test]
async fn test_step_over_round_trip() {
    let client = Arc::new(ScriptedClient::new());
    client.set_frames(vec![frame("f1", 10), frame("f2", 20)]);
    client.set_scope(frame("f1", 10), json!({ "bindings": [] }));
    let (coordinator, task) = session(client.clone());

    coordinator
        .paused(
            t("t1"),
            Some(frame("f1", 10)),
            PauseReasonKind::Breakpoint.into(),
            point("100"),
        )
        .await
        .unwrap();
    coordinator.step_over(&t("t1")).await.unwrap();

    let state = coordinator.store().state();
    assert!(!state.thread_context().is_paused);
    assert!(!state.is_paused(&t("t1")));
    // The round-trip has completed: the in-flight command is cleared but
    // the history remains.
    assert_eq!(state.pause_command(&t("t1")), None);
    assert_eq!(state.last_command(&t("t1")), Some(Command::StepOver));
    assert_eq!(
        state
            .previous_pause_frame_location(&t("t1"))
            .unwrap()
            .location,
        SourceLocation::new("s1", 10, 0)
    );
    assert!(
        client
            .calls()
            .contains(&ClientCall::Execute(t("t1"), Command::StepOver, None))
    );

    shutdown(&coordinator, task).await;
}

/// A rewind from below the top frame is bounded to the nearest prior
/// recorded point, compared numerically.
#[tokio::test]
async fn test_rewind_targets_nearest_prior_point() {
    let client = Arc::new(ScriptedClient::new());
    client.set_frames(vec![frame("f1", 10), frame("f2", 20)]);
    client.set_scope(frame("f1", 10), json!({}));
    client.set_scope(frame("f2", 20), json!({}));
    client.set_positions(fermata::FramePositions {
        positions: vec![
            fermata::PointPosition {
                point: point("9999999999999999999"),
                location: None,
            },
            fermata::PointPosition {
                point: point("10000000000000000001"),
                location: None,
            },
        ],
        unexecuted: vec![],
    });
    let (coordinator, task) = session(client.clone());

    coordinator
        .paused(
            t("t1"),
            Some(frame("f1", 10)),
            PauseReasonKind::Breakpoint.into(),
            point("10000000000000000000"),
        )
        .await
        .unwrap();
    // Stepping targets only exist below the top frame.
    coordinator
        .select_frame(&t("t1"), &FrameId::from("f2"))
        .await
        .unwrap();
    coordinator.rewind(&t("t1")).await.unwrap();

    assert!(client.calls().contains(&ClientCall::Execute(
        t("t1"),
        Command::Rewind,
        Some(point("9999999999999999999")),
    )));

    shutdown(&coordinator, task).await;
}

#[tokio::test]
async fn test_break_on_next_interrupts_backend() {
    let client = Arc::new(ScriptedClient::new());
    let (coordinator, task) = session(client.clone());

    coordinator.break_on_next(&t("t1")).await.unwrap();

    assert!(coordinator.store().state().is_waiting_on_break(&t("t1")));
    assert_eq!(client.calls(), vec![ClientCall::Interrupt(t("t1"))]);

    shutdown(&coordinator, task).await;
}

#[tokio::test]
async fn test_evaluate_flags_thread_then_clears() {
    let client = Arc::new(ScriptedClient::new());
    client.set_frames(vec![frame("f1", 10)]);
    client.set_scope(frame("f1", 10), json!({}));
    client.set_evaluation(json!(42));
    let (coordinator, task) = session(client.clone());

    coordinator
        .paused(
            t("t1"),
            Some(frame("f1", 10)),
            PauseReasonKind::DebuggerStatement.into(),
            point("7"),
        )
        .await
        .unwrap();
    let value = coordinator.evaluate(&t("t1"), "6 * 7").await.unwrap();

    assert_eq!(value, json!(42));
    let state = coordinator.store().state();
    assert!(!state.is_evaluating_expression(&t("t1")));
    assert!(
        client
            .calls()
            .contains(&ClientCall::Evaluate(t("t1"), "6 * 7".to_string()))
    );

    shutdown(&coordinator, task).await;
}

/// With skip-pausing on, a backend pause bounces straight into a resume.
#[tokio::test]
async fn test_skip_pausing_resumes_immediately() {
    let client = Arc::new(ScriptedClient::new());
    let (coordinator, task) = session(client.clone());

    coordinator.toggle_skip_pausing(true).await.unwrap();
    coordinator
        .paused(
            t("t1"),
            None,
            PauseReasonKind::Breakpoint.into(),
            point("100"),
        )
        .await
        .unwrap();

    let state = coordinator.store().state();
    assert!(!state.is_paused(&t("t1")));
    assert_eq!(
        client.calls(),
        vec![ClientCall::Execute(t("t1"), Command::Resume, None)]
    );

    shutdown(&coordinator, task).await;
}

/// Raw protocol events route through the same store transitions.
#[tokio::test]
async fn test_wire_events_reach_the_store() {
    let client = Arc::new(ScriptedClient::new());
    let (coordinator, task) = session(client.clone());

    coordinator
        .wire_event(&json!({ "type": "BREAK_ON_NEXT", "thread": "t1" }))
        .await
        .unwrap();
    assert!(coordinator.store().state().is_waiting_on_break(&t("t1")));

    // Unknown events are no-ops, not errors.
    coordinator
        .wire_event(&json!({ "type": "TOGGLE_SOURCE_MAPS" }))
        .await
        .unwrap();

    // Thread-scoped events without a thread fail fast.
    let err = coordinator
        .wire_event(&json!({ "type": "SELECT_FRAME" }))
        .await
        .unwrap_err();
    assert!(matches!(err, fermata::Error::MissingThread("SELECT_FRAME")));

    shutdown(&coordinator, task).await;
}
