use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use crate::{
    Command, ExecutionPoint, Frame, FrameId, FramePositions, FrameScope, MappedLocation,
    PauseReason, SourceLocation, ThreadId,
};

/// Inline preview values cached for one frame: line number to expression
/// text to the (opaque) value shown next to it in the source view.
pub type Previews = HashMap<u32, HashMap<String, serde_json::Value>>;

/// Cross-thread generation counter, bumped on every navigation.
///
/// Counters are the sole staleness mechanism: an async reply stamped with an
/// old counter is silently discarded by the coordinator. No wall-clock
/// timestamps are involved anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalContext {
    pub navigate_counter: u64,
}

/// Identity and pause status of the current thread, with the generation
/// counters collaborators stamp their in-flight requests with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadContext {
    pub navigate_counter: u64,
    pub thread: ThreadId,
    pub is_paused: bool,
    pub pause_counter: u64,
}

/// Snapshot of the generation counters taken before an async round-trip.
///
/// A reply is applied only when the stamp still matches the store; any
/// intervening pause, resume, thread switch or navigation invalidates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStamp {
    pub navigate_counter: u64,
    pub pause_counter: u64,
    pub thread: ThreadId,
}

/// Pause state associated with an individual thread.
///
/// Entries are created lazily on first reference; an unknown thread reads as
/// the resumed/empty default. `frames == None` while paused means the full
/// stack has not been fetched yet and is distinct from a resumed thread,
/// whose transient fields have been cleared wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPauseState {
    pub why: Option<PauseReason>,
    pub is_waiting_on_break: bool,
    pub frames: Option<Vec<Frame>>,
    pub frames_loading: bool,
    pub frame_positions: Option<FramePositions>,
    pub frame_scopes: HashMap<FrameId, FrameScope>,
    pub selected_frame_id: Option<FrameId>,
    pub execution_point: Option<ExecutionPoint>,

    /// Scope paths expanded in the current pause.
    pub expanded_scopes: HashSet<String>,

    /// Scope paths that were expanded in the previous pause. Kept separate
    /// from `expanded_scopes` so the next pause can restore a sensible
    /// default without tracking the current expansion live, and so stale
    /// entries never need pruning.
    pub last_expanded_scopes: Vec<String>,

    pub command: Option<Command>,
    pub last_command: Option<Command>,
    pub was_stepping: bool,
    pub previous_location: Option<MappedLocation>,
    pub inline_preview: HashMap<FrameId, Previews>,
    pub highlighted_calls: Option<Vec<SourceLocation>>,
}

impl Default for ThreadPauseState {
    fn default() -> Self {
        Self {
            why: None,
            is_waiting_on_break: false,
            frames: None,
            frames_loading: false,
            frame_positions: None,
            frame_scopes: HashMap::new(),
            selected_frame_id: None,
            execution_point: None,
            expanded_scopes: HashSet::new(),
            last_expanded_scopes: Vec::new(),
            command: None,
            last_command: None,
            was_stepping: false,
            previous_location: None,
            inline_preview: HashMap::new(),
            highlighted_calls: None,
        }
    }
}

impl ThreadPauseState {
    /// Reset the per-pause transient fields to the resumed baseline.
    ///
    /// Command history, break-on-next, expanded-scope tracking and recorded
    /// frame positions survive; everything tied to the pause itself goes.
    pub(crate) fn clear_to_resumed(&mut self) {
        self.frames = None;
        self.frames_loading = false;
        self.frame_scopes.clear();
        self.selected_frame_id = None;
        self.execution_point = None;
        self.why = None;
        self.inline_preview.clear();
        self.highlighted_calls = None;
    }
}

static DEFAULT_THREAD_STATE: LazyLock<ThreadPauseState> =
    LazyLock::new(ThreadPauseState::default);

/// Process-wide pause state: per-thread pause records plus the cross-thread
/// context. One instance exists per debugging session; it is owned by the
/// store and only ever replaced through the transition function.
#[derive(Debug, Clone, PartialEq)]
pub struct PauseState {
    pub global_context: GlobalContext,
    pub thread_context: ThreadContext,
    pub threads: HashMap<ThreadId, ThreadPauseState>,
    pub skip_pausing: bool,
    pub should_log_exceptions: bool,
    /// Transient hover-preview location, independent of any thread's pause.
    pub preview_location: Option<SourceLocation>,
}

impl PauseState {
    pub fn new(thread: ThreadId, skip_pausing: bool, should_log_exceptions: bool) -> Self {
        Self {
            global_context: GlobalContext::default(),
            thread_context: ThreadContext {
                navigate_counter: 0,
                thread,
                is_paused: false,
                pause_counter: 0,
            },
            threads: HashMap::new(),
            skip_pausing,
            should_log_exceptions,
            preview_location: None,
        }
    }

    /// Pause state of the given thread. Unknown threads read as the
    /// resumed/empty default; no entry is allocated for them.
    pub fn thread_state(&self, thread: &ThreadId) -> &ThreadPauseState {
        self.threads.get(thread).unwrap_or(&DEFAULT_THREAD_STATE)
    }

    pub(crate) fn thread_state_mut(&mut self, thread: &ThreadId) -> &mut ThreadPauseState {
        self.threads.entry(thread.clone()).or_default()
    }

    /// Snapshot the generation counters for an async round-trip.
    pub fn stamp(&self) -> ContextStamp {
        ContextStamp {
            navigate_counter: self.global_context.navigate_counter,
            pause_counter: self.thread_context.pause_counter,
            thread: self.thread_context.thread.clone(),
        }
    }

    /// Whether a reply stamped with `stamp` is still applicable.
    pub fn is_current(&self, stamp: &ContextStamp) -> bool {
        stamp.navigate_counter == self.global_context.navigate_counter
            && stamp.pause_counter == self.thread_context.pause_counter
            && stamp.thread == self.thread_context.thread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_thread_reads_as_default() {
        let state = PauseState::new(ThreadId::from("t1"), false, false);
        let ts = state.thread_state(&ThreadId::from("worker-99"));
        assert_eq!(*ts, ThreadPauseState::default());
        assert!(state.threads.is_empty());
    }

    #[test]
    fn test_stamp_invalidated_by_counter_change() {
        let mut state = PauseState::new(ThreadId::from("t1"), false, false);
        let stamp = state.stamp();
        assert!(state.is_current(&stamp));

        state.thread_context.pause_counter += 1;
        assert!(!state.is_current(&stamp));
    }

    #[test]
    fn test_stamp_invalidated_by_thread_switch() {
        let mut state = PauseState::new(ThreadId::from("t1"), false, false);
        let stamp = state.stamp();
        state.thread_context.thread = ThreadId::from("t2");
        assert!(!state.is_current(&stamp));
    }
}
