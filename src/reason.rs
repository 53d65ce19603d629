use serde::{Deserialize, Serialize};

/// Why a thread stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseReasonKind {
    Breakpoint,
    DebuggerStatement,
    Exception,
    ResumeLimit,
    Interrupted,
    #[serde(other)]
    Unknown,
}

/// Reason attached to a pause event by the replay backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseReason {
    #[serde(rename = "type")]
    pub kind: PauseReasonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PauseReason {
    pub fn new(kind: PauseReasonKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn with_message(kind: PauseReasonKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }
}

impl From<PauseReasonKind> for PauseReason {
    fn from(kind: PauseReasonKind) -> Self {
        Self::new(kind)
    }
}
