use std::sync::Arc;

use tokio::sync::{mpsc::error::SendError, oneshot::error::RecvError};

use crate::ThreadId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A thread-scoped event arrived without a thread id. This is a
    /// programming-contract violation, not a recoverable condition.
    #[error("Event '{0}' requires a thread id")]
    MissingThread(&'static str),

    #[error("Cannot append async frames for thread '{0}': stack not loaded")]
    StackNotLoaded(ThreadId),

    #[error("Invalid execution point '{0}': expected a decimal digit string")]
    InvalidPoint(String),

    #[error("Couldn't deliver the event to the store: {0}")]
    SendError(String),

    #[error("The pause store has shut down")]
    StoreClosed,

    #[error("Store task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Replay client error: {0}")]
    Client(Arc<str>),

    #[error("Malformed protocol payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl<T> From<SendError<T>> for Error {
    fn from(e: SendError<T>) -> Self {
        Error::SendError(e.to_string())
    }
}

impl From<RecvError> for Error {
    fn from(_: RecvError) -> Self {
        Error::StoreClosed
    }
}

impl Error {
    /// Wrap an error raised by the replay backend.
    pub fn client<E: std::fmt::Display>(e: E) -> Self {
        Error::Client(Arc::from(e.to_string()))
    }
}
