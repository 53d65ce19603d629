//! The pure state-transition function of the pause store.
//!
//! `transition` derives a new [`PauseState`] from the previous state and one
//! [`PauseEvent`], with no I/O and no side effects. The input state is never
//! mutated: an event either yields a fully-updated successor state or an
//! error, so no transition can be observed half-applied.

use crate::{
    Command, CommandStatus, Error, FramePositions, FrameScope, MappedLocation, PauseEvent,
    PauseState, Result, ThreadContext, ThreadId,
};

pub fn transition(state: &PauseState, event: &PauseEvent) -> Result<PauseState> {
    use PauseEvent as E;

    let mut next = state.clone();
    match event {
        E::SelectThread { thread } => {
            next.thread_context = ThreadContext {
                navigate_counter: state.thread_context.navigate_counter,
                thread: thread.clone(),
                is_paused: state.thread_state(thread).frames.is_some(),
                pause_counter: state.thread_context.pause_counter + 1,
            };
        }

        E::Paused {
            thread,
            frame,
            why,
            execution_point,
        } => {
            next.preview_location = None;
            next.thread_context.thread = thread.clone();
            next.thread_context.is_paused = true;
            next.thread_context.pause_counter += 1;

            let ts = next.thread_state_mut(thread);
            ts.is_waiting_on_break = false;
            ts.selected_frame_id = frame.as_ref().map(|f| f.id.clone());
            // The backend may hand over the top frame eagerly; the full
            // stack is fetched separately while `frames_loading` is set.
            ts.frames = frame.as_ref().map(|f| vec![f.clone()]);
            ts.frames_loading = true;
            ts.frame_scopes.clear();
            ts.why = Some(why.clone());
            ts.execution_point = Some(execution_point.clone());
        }

        E::FetchedFrames { thread, frames } => {
            let ts = next.thread_state_mut(thread);
            ts.selected_frame_id = frames.first().map(|f| f.id.clone());
            ts.frames = Some(frames.clone());
            ts.frames_loading = false;
        }

        E::AddAsyncFrames { thread, frames } => {
            let ts = next.thread_state_mut(thread);
            let Some(stack) = ts.frames.as_mut() else {
                return Err(Error::StackNotLoaded(thread.clone()));
            };
            stack.extend(frames.iter().cloned());
        }

        E::AddScopes {
            thread,
            frame,
            status,
            value,
        } => {
            next.thread_state_mut(thread)
                .frame_scopes
                .insert(frame.clone(), FrameScope::new(*status, value.clone()));
        }

        E::SetFramePositions {
            thread,
            positions,
            unexecuted,
        } => {
            next.thread_state_mut(thread).frame_positions = Some(FramePositions {
                positions: positions.clone(),
                unexecuted: unexecuted.clone(),
            });
        }

        E::ClearFramePositions { thread } => {
            next.thread_state_mut(thread).frame_positions = None;
        }

        E::BreakOnNext { thread } => {
            next.thread_state_mut(thread).is_waiting_on_break = true;
        }

        E::SelectFrame { thread, frame } => {
            next.thread_state_mut(thread).selected_frame_id = Some(frame.clone());
        }

        E::Command {
            thread,
            command,
            status,
        } => {
            if status.is_start() {
                let previous_location = step_over_origin(state, thread, *command);
                next.thread_context.is_paused = false;
                next.thread_context.pause_counter += 1;

                let ts = next.thread_state_mut(thread);
                ts.clear_to_resumed();
                ts.command = Some(*command);
                ts.last_command = Some(*command);
                ts.previous_location = previous_location;
            } else {
                next.thread_state_mut(thread).command = None;
            }
        }

        E::Resume {
            thread,
            was_stepping,
        } => {
            if *thread == state.thread_context.thread {
                next.thread_context.is_paused = false;
                next.thread_context.pause_counter += 1;
            }
            let ts = next.thread_state_mut(thread);
            ts.clear_to_resumed();
            ts.was_stepping = *was_stepping;
            ts.last_expanded_scopes = ts.expanded_scopes.drain().collect();
        }

        E::EvaluateExpression { thread, status } => {
            next.thread_state_mut(thread).command = match status {
                CommandStatus::Start => Some(Command::Expression),
                _ => None,
            };
        }

        E::Navigate { main_thread } => {
            let navigate_counter = state.global_context.navigate_counter + 1;
            next.global_context.navigate_counter = navigate_counter;
            next.thread_context = ThreadContext {
                navigate_counter,
                thread: main_thread.clone(),
                is_paused: false,
                pause_counter: 0,
            };
            // Only the thread that survives navigation is carried over, with
            // its transient pause fields reset; all other threads are gone.
            let mut ts = state.thread_state(main_thread).clone();
            ts.clear_to_resumed();
            next.threads.clear();
            next.threads.insert(main_thread.clone(), ts);
        }

        E::Connect { main_thread } => {
            // Full reset. The preference-backed flags carry over: they are
            // kept in sync with the preference collaborator on every toggle,
            // so their current values are the persisted values.
            next = PauseState::new(
                main_thread.clone(),
                state.skip_pausing,
                state.should_log_exceptions,
            );
        }

        E::ToggleSkipPausing { skip_pausing } => {
            next.skip_pausing = *skip_pausing;
        }

        E::LogExceptions {
            should_log_exceptions,
        } => {
            next.should_log_exceptions = *should_log_exceptions;
        }

        E::SetExpandedScope {
            thread,
            path,
            expanded,
        } => {
            let scopes = &mut next.thread_state_mut(thread).expanded_scopes;
            if *expanded {
                scopes.insert(path.clone());
            } else {
                scopes.remove(path);
            }
        }

        E::AddInlinePreview {
            thread,
            frame,
            previews,
        } => {
            next.thread_state_mut(thread)
                .inline_preview
                .insert(frame.clone(), previews.clone());
        }

        E::HighlightCalls { thread, calls } => {
            next.thread_state_mut(thread).highlighted_calls = Some(calls.clone());
        }

        E::UnhighlightCalls { thread } => {
            next.thread_state_mut(thread).highlighted_calls = None;
        }

        E::PreviewPausedLocation { location } => {
            next.preview_location = Some(location.clone());
        }

        E::ClearPreviewPausedLocation => {
            next.preview_location = None;
        }

        E::Batch(events) => {
            for event in events {
                next = transition(&next, event)?;
            }
        }
    }

    Ok(next)
}

/// The location a step-over starts from, recorded so the coordinator can
/// guarantee a step-over never reports a no-op stop at the identical spot.
/// Other commands carry no such guard and record nothing.
fn step_over_origin(
    state: &PauseState,
    thread: &ThreadId,
    command: Command,
) -> Option<MappedLocation> {
    if command != Command::StepOver {
        return None;
    }
    let ts = state.thread_state(thread);
    match ts.frames.as_ref().and_then(|frames| frames.first()) {
        Some(frame) => Some(MappedLocation {
            location: frame.location.clone(),
            generated_location: frame.generated_location.clone(),
        }),
        None => ts.previous_location.clone(),
    }
}
