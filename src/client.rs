use std::future::Future;

use serde_json::Value;

use crate::{Command, ExecutionPoint, Frame, FrameId, FramePositions, Result, ScopeStatus, ThreadId};

/// Scope data for one frame, as returned by the backend. `status` reflects
/// whether resolution is still streaming.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScopeReply {
    pub frame: Frame,
    pub status: ScopeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Transport to the replay backend (the "thread front").
///
/// The coordinator treats this as an opaque async data source: each method
/// is one backend round-trip and may suspend arbitrarily long. Replies are
/// applied to the store only if the coordinator's context stamp is still
/// current, so implementations never need to cancel anything.
///
/// Methods return futures; implementors can write them as plain `async fn`.
pub trait ReplayClient: Send + Sync + 'static {
    /// Fetch the full ordered frame stack of a paused thread.
    fn frames(&self, thread: &ThreadId) -> impl Future<Output = Result<Vec<Frame>>> + Send;

    /// Fetch the variable scopes visible at one frame.
    fn scopes(
        &self,
        thread: &ThreadId,
        frame: &FrameId,
    ) -> impl Future<Output = Result<ScopeReply>> + Send;

    /// Fetch the execution points recorded within the current frame stack.
    fn frame_positions(
        &self,
        thread: &ThreadId,
    ) -> impl Future<Output = Result<FramePositions>> + Send;

    /// Issue a resumption command, optionally bounded to a target point
    /// computed from the recorded frame positions.
    fn execute(
        &self,
        thread: &ThreadId,
        command: Command,
        target: Option<ExecutionPoint>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Request a pause at the next opportunity ("break on next").
    fn interrupt(&self, thread: &ThreadId) -> impl Future<Output = Result<()>> + Send;

    /// Evaluate an expression in the context of a frame.
    fn evaluate(
        &self,
        thread: &ThreadId,
        frame: Option<&FrameId>,
        expression: &str,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Toggle pause-on-exception logging in the backend.
    fn set_log_exceptions(&self, enabled: bool) -> impl Future<Output = Result<()>> + Send;
}
