use std::sync::Arc;

use futures_util::future::join;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    Command, CommandStatus, ContextStamp, ExecutionPoint, Frame, FrameId, PauseEvent, PauseReason,
    ReplayClient, Result, SourceLocation, StoreHandle, ThreadId,
};

/// Issues commands to the replay backend and feeds the resulting events into
/// the pause store.
///
/// Every backend round-trip is bracketed by a context stamp: the generation
/// counters are snapshotted before the await and re-checked before the reply
/// is dispatched. A reply that comes back after an intervening pause,
/// resume, thread switch or navigation is silently dropped; that is the only
/// cancellation mechanism, and the reason no request here ever needs an
/// explicit cancel.
pub struct Coordinator<C: ReplayClient> {
    store: StoreHandle,
    client: Arc<C>,
}

impl<C: ReplayClient> Clone for Coordinator<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            client: self.client.clone(),
        }
    }
}

impl<C: ReplayClient> Coordinator<C> {
    pub fn new(store: StoreHandle, client: Arc<C>) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Start a session against the given main thread.
    pub async fn connect(&self, main_thread: ThreadId) -> Result {
        self.store.dispatch(PauseEvent::Connect { main_thread }).await
    }

    /// The page navigated; all threads except the new main thread are gone.
    pub async fn navigate(&self, main_thread: ThreadId) -> Result {
        self.store.dispatch(PauseEvent::Navigate { main_thread }).await
    }

    pub async fn select_thread(&self, thread: ThreadId) -> Result {
        self.store.dispatch(PauseEvent::SelectThread { thread }).await
    }

    /// Handle a pause event from the backend: record the pause, then load
    /// the full stack and, once it is in, the top frame's scopes and the
    /// recorded frame positions.
    pub async fn paused(
        &self,
        thread: ThreadId,
        frame: Option<Frame>,
        why: PauseReason,
        execution_point: ExecutionPoint,
    ) -> Result {
        if self.store.state().skip_pausing() {
            // The user asked to skip all pauses; bounce straight off.
            return self.client.execute(&thread, Command::Resume, None).await;
        }

        self.store
            .dispatch(PauseEvent::Paused {
                thread: thread.clone(),
                frame,
                why,
                execution_point,
            })
            .await?;

        let stamp = self.store.stamp();
        let frames = self.client.frames(&thread).await?;
        if !self.store.is_current(&stamp) {
            debug!(thread = %thread, "dropping stale frames reply");
            return Ok(());
        }
        let top = frames.first().map(|f| f.id.clone());
        self.store
            .dispatch(PauseEvent::FetchedFrames {
                thread: thread.clone(),
                frames,
            })
            .await?;

        let Some(top) = top else {
            return Ok(());
        };

        // Scopes and positions are independent; fetch them concurrently and
        // apply whichever arrives intact. A failure in either leaves the
        // corresponding data pending, it does not abort the pause.
        let (scopes, positions) = join(
            self.fetch_scopes(&stamp, &thread, &top),
            self.fetch_frame_positions(&stamp, &thread),
        )
        .await;
        if let Err(e) = scopes {
            warn!(thread = %thread, frame = %top, error = %e, "scope fetch failed");
        }
        if let Err(e) = positions {
            warn!(thread = %thread, error = %e, "frame position fetch failed");
        }
        Ok(())
    }

    /// Route a raw protocol event into the store. Unknown event types are
    /// ignored; thread-scoped events without a thread id fail fast.
    pub async fn wire_event(&self, value: &Value) -> Result {
        match PauseEvent::from_wire(value)? {
            Some(event) => self.store.dispatch(event).await,
            None => Ok(()),
        }
    }

    /// Fetch scope bindings for one frame, applying the reply only if the
    /// pause it belongs to is still current.
    pub async fn fetch_scopes(
        &self,
        stamp: &ContextStamp,
        thread: &ThreadId,
        frame: &FrameId,
    ) -> Result {
        let reply = self.client.scopes(thread, frame).await?;
        if !self.store.is_current(stamp) {
            debug!(thread = %thread, frame = %frame, "dropping stale scope reply");
            return Ok(());
        }
        self.store
            .dispatch(PauseEvent::AddScopes {
                thread: thread.clone(),
                frame: reply.frame.id,
                status: reply.status,
                value: reply.value,
            })
            .await
    }

    async fn fetch_frame_positions(&self, stamp: &ContextStamp, thread: &ThreadId) -> Result {
        let reply = self.client.frame_positions(thread).await?;
        if !self.store.is_current(stamp) {
            debug!(thread = %thread, "dropping stale frame position reply");
            return Ok(());
        }
        self.store
            .dispatch(PauseEvent::SetFramePositions {
                thread: thread.clone(),
                positions: reply.positions,
                unexecuted: reply.unexecuted,
            })
            .await
    }

    /// Issue a resumption command: mark it started, run the backend
    /// round-trip (bounded to a target point computed from the recorded
    /// frame positions) and mark it finished.
    pub async fn command(&self, thread: &ThreadId, command: Command) -> Result {
        let target = self
            .store
            .state()
            .resume_target(command)
            .cloned();
        self.store
            .dispatch(PauseEvent::Command {
                thread: thread.clone(),
                command,
                status: CommandStatus::Start,
            })
            .await?;

        let outcome = self.client.execute(thread, command, target).await;
        let status = match &outcome {
            Ok(()) => CommandStatus::Done,
            Err(_) => CommandStatus::Error,
        };
        self.store
            .dispatch(PauseEvent::Command {
                thread: thread.clone(),
                command,
                status,
            })
            .await?;
        outcome
    }

    pub async fn resume(&self, thread: &ThreadId) -> Result {
        self.command(thread, Command::Resume).await
    }

    pub async fn step_over(&self, thread: &ThreadId) -> Result {
        self.command(thread, Command::StepOver).await
    }

    pub async fn step_in(&self, thread: &ThreadId) -> Result {
        self.command(thread, Command::StepIn).await
    }

    pub async fn step_out(&self, thread: &ThreadId) -> Result {
        self.command(thread, Command::StepOut).await
    }

    pub async fn rewind(&self, thread: &ThreadId) -> Result {
        self.command(thread, Command::Rewind).await
    }

    pub async fn reverse_step_over(&self, thread: &ThreadId) -> Result {
        self.command(thread, Command::ReverseStepOver).await
    }

    /// Ask the backend to pause at the next opportunity.
    pub async fn break_on_next(&self, thread: &ThreadId) -> Result {
        self.store
            .dispatch(PauseEvent::BreakOnNext {
                thread: thread.clone(),
            })
            .await?;
        self.client.interrupt(thread).await
    }

    /// Inspect another frame of the paused stack, lazily fetching its
    /// scopes if they are not in yet.
    pub async fn select_frame(&self, thread: &ThreadId, frame: &FrameId) -> Result {
        self.store
            .dispatch(PauseEvent::SelectFrame {
                thread: thread.clone(),
                frame: frame.clone(),
            })
            .await?;

        if self.store.state().frame_scope(thread, frame).is_some() {
            return Ok(());
        }
        let stamp = self.store.stamp();
        self.fetch_scopes(&stamp, thread, frame).await
    }

    /// Evaluate an expression in the selected frame, flagging the thread as
    /// busy evaluating for the duration.
    pub async fn evaluate(&self, thread: &ThreadId, expression: &str) -> Result<Value> {
        self.store
            .dispatch(PauseEvent::EvaluateExpression {
                thread: thread.clone(),
                status: CommandStatus::Start,
            })
            .await?;
        let stamp = self.store.stamp();
        let frame = self.store.state().selected_frame_id(thread).cloned();

        let outcome = self
            .client
            .evaluate(thread, frame.as_ref(), expression)
            .await;

        if self.store.is_current(&stamp) {
            let status = match &outcome {
                Ok(_) => CommandStatus::Done,
                Err(_) => CommandStatus::Error,
            };
            self.store
                .dispatch(PauseEvent::EvaluateExpression {
                    thread: thread.clone(),
                    status,
                })
                .await?;
        } else {
            debug!(thread = %thread, "dropping stale evaluation status");
        }
        outcome
    }

    pub async fn toggle_skip_pausing(&self, skip_pausing: bool) -> Result {
        self.store
            .dispatch(PauseEvent::ToggleSkipPausing { skip_pausing })
            .await
    }

    /// Toggle exception logging in both the store and the backend.
    pub async fn log_exceptions(&self, should_log_exceptions: bool) -> Result {
        self.store
            .dispatch(PauseEvent::LogExceptions {
                should_log_exceptions,
            })
            .await?;
        self.client.set_log_exceptions(should_log_exceptions).await
    }

    pub async fn highlight_calls(&self, thread: &ThreadId, calls: Vec<SourceLocation>) -> Result {
        self.store
            .dispatch(PauseEvent::HighlightCalls {
                thread: thread.clone(),
                calls,
            })
            .await
    }

    pub async fn unhighlight_calls(&self, thread: &ThreadId) -> Result {
        self.store
            .dispatch(PauseEvent::UnhighlightCalls {
                thread: thread.clone(),
            })
            .await
    }

    pub async fn set_expanded_scope(
        &self,
        thread: &ThreadId,
        path: String,
        expanded: bool,
    ) -> Result {
        self.store
            .dispatch(PauseEvent::SetExpandedScope {
                thread: thread.clone(),
                path,
                expanded,
            })
            .await
    }
}
