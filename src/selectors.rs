//! Read-only queries over [`PauseState`].
//!
//! Selectors are total: data that is absent (unknown thread, unfetched
//! frames, missing scope) reads as `None` or an empty value, never a fault.
//! Thread-scoped selectors take the thread explicitly; `current_*` variants
//! default to the context thread.

use crate::{
    Command, ExecutionPoint, Frame, FrameId, FramePositions, FrameScope, GlobalContext,
    MappedLocation, PauseReason, Previews, SourceId, SourceLocation, ThreadContext, ThreadId,
    state::PauseState,
};

impl PauseState {
    pub fn context(&self) -> &GlobalContext {
        &self.global_context
    }

    pub fn thread_context(&self) -> &ThreadContext {
        &self.thread_context
    }

    pub fn current_thread(&self) -> &ThreadId {
        &self.thread_context.thread
    }

    pub fn pause_reason(&self, thread: &ThreadId) -> Option<&PauseReason> {
        self.thread_state(thread).why.as_ref()
    }

    pub fn pause_command(&self, thread: &ThreadId) -> Option<Command> {
        self.thread_state(thread).command
    }

    pub fn last_command(&self, thread: &ThreadId) -> Option<Command> {
        self.thread_state(thread).last_command
    }

    pub fn was_stepping(&self, thread: &ThreadId) -> bool {
        self.thread_state(thread).was_stepping
    }

    /// True while the thread's in-flight command is one of the forward
    /// stepping modes.
    pub fn is_stepping(&self, thread: &ThreadId) -> bool {
        self.pause_command(thread)
            .is_some_and(Command::is_stepping)
    }

    /// Whether the thread's last recorded event was a pause. This holds from
    /// the pause event on, whether or not the frame stack has arrived yet.
    pub fn is_paused(&self, thread: &ThreadId) -> bool {
        let ts = self.thread_state(thread);
        ts.why.is_some() || ts.frames.is_some()
    }

    pub fn is_waiting_on_break(&self, thread: &ThreadId) -> bool {
        self.thread_state(thread).is_waiting_on_break
    }

    pub fn is_evaluating_expression(&self, thread: &ThreadId) -> bool {
        self.pause_command(thread) == Some(Command::Expression)
    }

    pub fn previous_pause_frame_location(&self, thread: &ThreadId) -> Option<&MappedLocation> {
        self.thread_state(thread).previous_location.as_ref()
    }

    pub fn should_log_exceptions(&self) -> bool {
        self.should_log_exceptions
    }

    pub fn skip_pausing(&self) -> bool {
        self.skip_pausing
    }

    /// The thread's call stack, or `None` while the full stack fetch is
    /// still in flight (even when an eager top frame was seeded) or the
    /// thread is resumed.
    pub fn frames(&self, thread: &ThreadId) -> Option<&[Frame]> {
        let ts = self.thread_state(thread);
        if ts.frames_loading {
            return None;
        }
        ts.frames.as_deref()
    }

    pub fn current_thread_frames(&self) -> Option<&[Frame]> {
        self.frames(&self.thread_context.thread)
    }

    pub fn frames_loading(&self, thread: &ThreadId) -> bool {
        let ts = self.thread_state(thread);
        ts.frames.is_some() && ts.frames_loading
    }

    pub fn frame_scope(&self, thread: &ThreadId, frame: &FrameId) -> Option<&FrameScope> {
        self.thread_state(thread).frame_scopes.get(frame)
    }

    pub fn selected_frame_id(&self, thread: &ThreadId) -> Option<&FrameId> {
        self.thread_state(thread).selected_frame_id.as_ref()
    }

    pub fn selected_frame(&self, thread: &ThreadId) -> Option<&Frame> {
        let id = self.selected_frame_id(thread)?;
        self.frames(thread)?.iter().find(|f| &f.id == id)
    }

    /// Scope bindings of the selected frame, once resolved.
    pub fn selected_scope(&self, thread: &ThreadId) -> Option<&serde_json::Value> {
        let id = self.selected_frame_id(thread)?;
        self.frame_scope(thread, id)?.scope.as_ref()
    }

    pub fn top_frame(&self, thread: &ThreadId) -> Option<&Frame> {
        self.frames(thread)?.first()
    }

    /// Whether the selected frame is the innermost one. Holds vacuously
    /// while no stack is available, matching the resume-target guard.
    pub fn is_top_frame(&self, thread: &ThreadId) -> bool {
        let top = self.top_frame(thread).map(|f| &f.id);
        let selected = self.selected_frame(thread).map(|f| &f.id);
        top == selected
    }

    pub fn thread_execution_point(&self, thread: &ThreadId) -> Option<&ExecutionPoint> {
        self.thread_state(thread).execution_point.as_ref()
    }

    pub fn frame_positions(&self, thread: &ThreadId) -> Option<&FramePositions> {
        self.thread_state(thread).frame_positions.as_ref()
    }

    pub fn highlighted_calls(&self, thread: &ThreadId) -> Option<&[SourceLocation]> {
        self.thread_state(thread).highlighted_calls.as_deref()
    }

    pub fn inline_previews(&self, thread: &ThreadId, frame: &FrameId) -> Option<&Previews> {
        self.thread_state(thread).inline_preview.get(frame)
    }

    pub fn selected_inline_previews(&self) -> Option<&Previews> {
        let thread = self.current_thread().clone();
        let frame = self.selected_frame_id(&thread)?.clone();
        self.inline_previews(&thread, &frame)
    }

    pub fn inline_preview_expression(
        &self,
        thread: &ThreadId,
        frame: &FrameId,
        line: u32,
        expression: &str,
    ) -> Option<&serde_json::Value> {
        self.inline_previews(thread, frame)?
            .get(&line)?
            .get(expression)
    }

    pub fn expanded_scopes(&self, thread: &ThreadId) -> &std::collections::HashSet<String> {
        &self.thread_state(thread).expanded_scopes
    }

    pub fn last_expanded_scopes(&self, thread: &ThreadId) -> &[String] {
        &self.thread_state(thread).last_expanded_scopes
    }

    pub fn pause_preview_location(&self) -> Option<&SourceLocation> {
        self.preview_location.as_ref()
    }

    /// The execution point a resumption command should land on, derived from
    /// the current thread's recorded frame positions.
    ///
    /// `None` when no positions are recorded or the selection already sits
    /// on the outermost frame. Backward commands pick the last recorded
    /// point strictly below the current execution point; forward commands
    /// pick the first strictly above. Comparison is numeric over
    /// arbitrary-width points; no I/O is involved.
    pub fn resume_target(&self, command: Command) -> Option<&ExecutionPoint> {
        let thread = self.current_thread();
        let positions = &self.frame_positions(thread)?.positions;
        let current = self.thread_execution_point(thread)?;

        if self.is_top_frame(thread) {
            return None;
        }

        match command {
            Command::Rewind | Command::ReverseStepOver => positions
                .iter()
                .rev()
                .map(|p| &p.point)
                .find(|p| *p < current),
            Command::Resume | Command::StepOver | Command::StepIn | Command::StepOut => {
                positions.iter().map(|p| &p.point).find(|p| *p > current)
            }
            Command::Expression => None,
        }
    }

    /// Id of an alternate representation of the selected source, valid only
    /// while paused with the selected frame inside that exact source.
    pub fn alternate_source_id(&self, selected_source: &SourceId) -> Option<&SourceId> {
        let thread = self.current_thread();
        let frame = self.selected_frame(thread)?;
        if &frame.location.source_id != selected_source {
            return None;
        }
        frame.alternate_source_id()
    }
}
