use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Command, CommandStatus, Error, ExecutionPoint, Frame, FrameId, PauseReason, PointPosition,
    Previews, ScopeStatus, SourceLocation, ThreadId,
};

/// The event vocabulary of the pause store.
///
/// Every transition of the store is one of these events; they are produced
/// by the coordinator from backend replies and UI commands. Events that
/// operate on a thread carry its id explicitly, which is what makes
/// cross-thread interference impossible: a thread's state is only ever
/// touched by events tagged with that thread.
#[derive(Debug, Clone)]
pub enum PauseEvent {
    /// Make the given thread current.
    SelectThread { thread: ThreadId },
    /// The backend paused a thread, optionally handing over an eagerly
    /// available top frame ahead of the full stack fetch.
    Paused {
        thread: ThreadId,
        frame: Option<Frame>,
        why: PauseReason,
        execution_point: ExecutionPoint,
    },
    /// Full ordered stack for a paused thread, innermost first.
    FetchedFrames {
        thread: ThreadId,
        frames: Vec<Frame>,
    },
    /// Frames of an asynchronous continuation, appended below the stack.
    AddAsyncFrames {
        thread: ThreadId,
        frames: Vec<Frame>,
    },
    /// Scope bindings for one frame, possibly still resolving.
    AddScopes {
        thread: ThreadId,
        frame: FrameId,
        status: ScopeStatus,
        value: Option<Value>,
    },
    /// Execution points recorded for the thread's current frame stack.
    /// Replaces any previously recorded positions for the thread.
    SetFramePositions {
        thread: ThreadId,
        positions: Vec<PointPosition>,
        unexecuted: Vec<PointPosition>,
    },
    ClearFramePositions { thread: ThreadId },
    BreakOnNext { thread: ThreadId },
    SelectFrame { thread: ThreadId, frame: FrameId },
    Command {
        thread: ThreadId,
        command: Command,
        status: CommandStatus,
    },
    Resume {
        thread: ThreadId,
        was_stepping: bool,
    },
    EvaluateExpression {
        thread: ThreadId,
        status: CommandStatus,
    },
    Navigate { main_thread: ThreadId },
    Connect { main_thread: ThreadId },
    ToggleSkipPausing { skip_pausing: bool },
    LogExceptions { should_log_exceptions: bool },
    SetExpandedScope {
        thread: ThreadId,
        path: String,
        expanded: bool,
    },
    AddInlinePreview {
        thread: ThreadId,
        frame: FrameId,
        previews: Previews,
    },
    HighlightCalls {
        thread: ThreadId,
        calls: Vec<SourceLocation>,
    },
    UnhighlightCalls { thread: ThreadId },
    PreviewPausedLocation { location: SourceLocation },
    ClearPreviewPausedLocation,
    /// An ordered sequence of events applied as one transition; intermediate
    /// states are never observable.
    Batch(Vec<PauseEvent>),
}

impl PauseEvent {
    /// The event's wire name, used for logging and error reporting.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectThread { .. } => "SELECT_THREAD",
            Self::Paused { .. } => "PAUSED",
            Self::FetchedFrames { .. } => "FETCHED_FRAMES",
            Self::AddAsyncFrames { .. } => "ADD_ASYNC_FRAMES",
            Self::AddScopes { .. } => "ADD_SCOPES",
            Self::SetFramePositions { .. } => "SET_FRAME_POSITIONS",
            Self::ClearFramePositions { .. } => "CLEAR_FRAME_POSITIONS",
            Self::BreakOnNext { .. } => "BREAK_ON_NEXT",
            Self::SelectFrame { .. } => "SELECT_FRAME",
            Self::Command { .. } => "COMMAND",
            Self::Resume { .. } => "RESUME",
            Self::EvaluateExpression { .. } => "EVALUATE_EXPRESSION",
            Self::Navigate { .. } => "NAVIGATE",
            Self::Connect { .. } => "CONNECT",
            Self::ToggleSkipPausing { .. } => "TOGGLE_SKIP_PAUSING",
            Self::LogExceptions { .. } => "LOG_EXCEPTIONS",
            Self::SetExpandedScope { .. } => "SET_EXPANDED_SCOPE",
            Self::AddInlinePreview { .. } => "ADD_INLINE_PREVIEW",
            Self::HighlightCalls { .. } => "HIGHLIGHT_CALLS",
            Self::UnhighlightCalls { .. } => "UNHIGHLIGHT_CALLS",
            Self::PreviewPausedLocation { .. } => "PREVIEW_PAUSED_LOCATION",
            Self::ClearPreviewPausedLocation => "CLEAR_PREVIEW_PAUSED_LOCATION",
            Self::Batch(_) => "BATCH",
        }
    }

    /// Interpret a protocol-shaped JSON event.
    ///
    /// Returns `Ok(None)` for event types this core does not know, which the
    /// caller treats as a no-op. A thread-scoped event arriving without its
    /// thread id fails fast with [`Error::MissingThread`].
    pub fn from_wire(value: &Value) -> crate::Result<Option<PauseEvent>> {
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Ok(None);
        };

        let event = match kind {
            "SELECT_THREAD" => PauseEvent::SelectThread {
                thread: thread_of(value, "SELECT_THREAD")?,
            },
            "PAUSED" => PauseEvent::Paused {
                thread: thread_of(value, "PAUSED")?,
                frame: opt_field(value, "frame")?,
                why: field(value, "why")?,
                execution_point: field(value, "executionPoint")?,
            },
            "FETCHED_FRAMES" => PauseEvent::FetchedFrames {
                thread: thread_of(value, "FETCHED_FRAMES")?,
                frames: field(value, "frames")?,
            },
            "ADD_ASYNC_FRAMES" => PauseEvent::AddAsyncFrames {
                thread: thread_of(value, "ADD_ASYNC_FRAMES")?,
                frames: field(value, "asyncFrames")?,
            },
            "ADD_SCOPES" => PauseEvent::AddScopes {
                thread: thread_of(value, "ADD_SCOPES")?,
                frame: field::<Frame>(value, "frame")?.id,
                status: field(value, "status")?,
                value: opt_field(value, "value")?,
            },
            "SET_FRAME_POSITIONS" => PauseEvent::SetFramePositions {
                thread: thread_of(value, "SET_FRAME_POSITIONS")?,
                positions: field(value, "positions")?,
                unexecuted: opt_field(value, "unexecuted")?.unwrap_or_default(),
            },
            "CLEAR_FRAME_POSITIONS" => PauseEvent::ClearFramePositions {
                thread: thread_of(value, "CLEAR_FRAME_POSITIONS")?,
            },
            "BREAK_ON_NEXT" => PauseEvent::BreakOnNext {
                thread: thread_of(value, "BREAK_ON_NEXT")?,
            },
            "SELECT_FRAME" => PauseEvent::SelectFrame {
                thread: thread_of(value, "SELECT_FRAME")?,
                frame: field::<Frame>(value, "frame")?.id,
            },
            "COMMAND" => PauseEvent::Command {
                thread: thread_of(value, "COMMAND")?,
                command: field(value, "command")?,
                status: field(value, "status")?,
            },
            "RESUME" => PauseEvent::Resume {
                thread: thread_of(value, "RESUME")?,
                was_stepping: opt_field(value, "wasStepping")?.unwrap_or(false),
            },
            "EVALUATE_EXPRESSION" => PauseEvent::EvaluateExpression {
                thread: thread_of(value, "EVALUATE_EXPRESSION")?,
                status: field(value, "status")?,
            },
            "NAVIGATE" => PauseEvent::Navigate {
                main_thread: main_thread_of(value, "NAVIGATE")?,
            },
            "CONNECT" => PauseEvent::Connect {
                main_thread: main_thread_of(value, "CONNECT")?,
            },
            "TOGGLE_SKIP_PAUSING" => PauseEvent::ToggleSkipPausing {
                skip_pausing: field(value, "skipPausing")?,
            },
            "LOG_EXCEPTIONS" => PauseEvent::LogExceptions {
                should_log_exceptions: field(value, "shouldLogExceptions")?,
            },
            "SET_EXPANDED_SCOPE" => PauseEvent::SetExpandedScope {
                thread: thread_of(value, "SET_EXPANDED_SCOPE")?,
                path: field(value, "path")?,
                expanded: field(value, "expanded")?,
            },
            "ADD_INLINE_PREVIEW" => PauseEvent::AddInlinePreview {
                thread: thread_of(value, "ADD_INLINE_PREVIEW")?,
                frame: field(value, "frameId")?,
                previews: field(value, "previews")?,
            },
            "HIGHLIGHT_CALLS" => PauseEvent::HighlightCalls {
                thread: thread_of(value, "HIGHLIGHT_CALLS")?,
                calls: field(value, "highlightedCalls")?,
            },
            "UNHIGHLIGHT_CALLS" => PauseEvent::UnhighlightCalls {
                thread: thread_of(value, "UNHIGHLIGHT_CALLS")?,
            },
            "PREVIEW_PAUSED_LOCATION" => PauseEvent::PreviewPausedLocation {
                location: field(value, "location")?,
            },
            "CLEAR_PREVIEW_PAUSED_LOCATION" => PauseEvent::ClearPreviewPausedLocation,
            "BATCH" => {
                let updates = value
                    .get("updates")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let mut events = Vec::with_capacity(updates.len());
                for update in &updates {
                    // Unknown entries inside a batch are skipped, like any
                    // other unknown event.
                    if let Some(event) = PauseEvent::from_wire(update)? {
                        events.push(event);
                    }
                }
                PauseEvent::Batch(events)
            }
            _ => return Ok(None),
        };

        Ok(Some(event))
    }
}

fn field<T: DeserializeOwned>(value: &Value, name: &str) -> crate::Result<T> {
    let v = value.get(name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(v).map_err(Error::from)
}

fn opt_field<T: DeserializeOwned>(value: &Value, name: &str) -> crate::Result<Option<T>> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(Error::from),
    }
}

fn thread_of(value: &Value, event: &'static str) -> crate::Result<ThreadId> {
    value
        .get("thread")
        .and_then(Value::as_str)
        .map(ThreadId::from)
        .ok_or(Error::MissingThread(event))
}

/// `mainThread` arrives either as a bare id or as a thread descriptor
/// object whose `actor` field carries the id.
fn main_thread_of(value: &Value, event: &'static str) -> crate::Result<ThreadId> {
    let main = value.get("mainThread").ok_or(Error::MissingThread(event))?;
    main.as_str()
        .or_else(|| main.get("actor").and_then(Value::as_str))
        .map(ThreadId::from)
        .ok_or(Error::MissingThread(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_event_is_a_noop() {
        let event = PauseEvent::from_wire(&json!({ "type": "OPEN_QUICK_OPEN" })).unwrap();
        assert!(event.is_none());

        let event = PauseEvent::from_wire(&json!({ "no-type": true })).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_missing_thread_fails_fast() {
        let err = PauseEvent::from_wire(&json!({ "type": "BREAK_ON_NEXT" })).unwrap_err();
        assert!(matches!(err, Error::MissingThread("BREAK_ON_NEXT")));

        let err = PauseEvent::from_wire(&json!({
            "type": "PAUSED",
            "why": { "type": "breakpoint" },
            "executionPoint": "100",
        }))
        .unwrap_err();
        assert!(matches!(err, Error::MissingThread("PAUSED")));
    }

    #[test]
    fn test_paused_event_decodes() {
        let event = PauseEvent::from_wire(&json!({
            "type": "PAUSED",
            "thread": "t1",
            "frame": {
                "id": "f1",
                "location": { "sourceId": "s1", "line": 10, "column": 2 },
                "generatedLocation": { "sourceId": "s1-gen", "line": 12, "column": 4 },
            },
            "why": { "type": "breakpoint" },
            "executionPoint": "18446744073709551617",
        }))
        .unwrap()
        .expect("known event");

        match event {
            PauseEvent::Paused {
                thread,
                frame,
                why,
                execution_point,
            } => {
                assert_eq!(thread.as_str(), "t1");
                assert_eq!(frame.unwrap().id.as_str(), "f1");
                assert_eq!(why.kind, crate::PauseReasonKind::Breakpoint);
                assert_eq!(execution_point.as_str(), "18446744073709551617");
            }
            other => panic!("unexpected event {}", other.name()),
        }
    }

    #[test]
    fn test_navigate_accepts_thread_descriptor() {
        let event = PauseEvent::from_wire(&json!({
            "type": "NAVIGATE",
            "mainThread": { "actor": "main", "url": "https://example.test" },
        }))
        .unwrap()
        .expect("known event");
        match event {
            PauseEvent::Navigate { main_thread } => assert_eq!(main_thread.as_str(), "main"),
            other => panic!("unexpected event {}", other.name()),
        }
    }

    #[test]
    fn test_batch_skips_unknown_entries() {
        let event = PauseEvent::from_wire(&json!({
            "type": "BATCH",
            "updates": [
                { "type": "BREAK_ON_NEXT", "thread": "t1" },
                { "type": "SOMETHING_ELSE" },
                { "type": "CLEAR_PREVIEW_PAUSED_LOCATION" },
            ],
        }))
        .unwrap()
        .expect("known event");
        match event {
            PauseEvent::Batch(events) => {
                assert_eq!(events.len(), 2);
                assert_eq!(events[0].name(), "BREAK_ON_NEXT");
                assert_eq!(events[1].name(), "CLEAR_PREVIEW_PAUSED_LOCATION");
            }
            other => panic!("unexpected event {}", other.name()),
        }
    }
}
