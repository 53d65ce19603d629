use serde::{Deserialize, Serialize};

/// A requested resumption mode sent to the replay backend.
///
/// `Expression` is not a resumption: it marks a thread as busy evaluating
/// user input while remaining paused, so the UI can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Resume,
    StepOver,
    StepIn,
    StepOut,
    Rewind,
    ReverseStepOver,
    Expression,
}

impl Command {
    /// True for the three forward stepping modes.
    pub fn is_stepping(self) -> bool {
        matches!(self, Command::StepIn | Command::StepOver | Command::StepOut)
    }

    /// True for commands that move backwards through the recording.
    pub fn is_reverse(self) -> bool {
        matches!(self, Command::Rewind | Command::ReverseStepOver)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Resume => "resume",
            Command::StepOver => "stepOver",
            Command::StepIn => "stepIn",
            Command::StepOut => "stepOut",
            Command::Rewind => "rewind",
            Command::ReverseStepOver => "reverseStepOver",
            Command::Expression => "expression",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle of a command round-trip to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandStatus {
    Start,
    Done,
    Error,
}

impl CommandStatus {
    #[inline]
    pub fn is_start(self) -> bool {
        matches!(self, CommandStatus::Start)
    }
}
