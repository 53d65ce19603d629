//! Fermata - pause/time-travel coordination core
//!
//! The state machine behind a record-and-replay debugger's pause handling:
//! per-thread pause/step/rewind state, lazily loaded frames and scopes, and
//! exact big-integer ordering of recorded execution points.
//!
//! The pure core is [`transition`] over [`PauseState`]; [`PauseStore`] runs
//! it as a single-writer task and [`Coordinator`] drives the replay backend,
//! discarding any reply whose context stamp has gone stale.

mod client;
mod command;
mod config;
mod coordinator;
mod error;
mod event;
mod frame;
mod location;
mod point;
mod prefs;
mod reason;
mod scope;
mod selectors;
mod state;
mod store;
mod thread_id;
mod transition;

pub mod testing;

pub use client::{ReplayClient, ScopeReply};
pub use command::{Command, CommandStatus};
pub use config::Config;
pub use coordinator::Coordinator;
pub use error::Error;
pub use event::PauseEvent;
pub use frame::{Frame, FrameId};
pub use location::{MappedLocation, SourceId, SourceLocation};
pub use point::{ExecutionPoint, FramePositions, PointPosition};
pub use prefs::{MemoryPrefs, Preferences};
pub use reason::{PauseReason, PauseReasonKind};
pub use scope::{FrameScope, ScopeStatus};
pub use state::{
    ContextStamp, GlobalContext, PauseState, Previews, ThreadContext, ThreadPauseState,
};
pub use store::{PauseStore, StoreHandle};
pub use thread_id::ThreadId;
pub use transition::transition;

pub type Result<T = ()> = std::result::Result<T, Error>;
