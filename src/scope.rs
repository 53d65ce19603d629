use serde::{Deserialize, Serialize};

/// Resolution state of a scope reply. Scopes may be delivered in stages,
/// so a frame can hold partial bindings while the rest streams in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeStatus {
    Pending,
    Done,
}

/// Variable bindings visible at one frame, fetched lazily per frame.
///
/// The scope value itself is an opaque protocol document; this core stores
/// and hands it back without interpreting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameScope {
    pub pending: bool,
    pub scope: Option<serde_json::Value>,
}

impl FrameScope {
    pub fn new(status: ScopeStatus, scope: Option<serde_json::Value>) -> Self {
        Self {
            pending: status != ScopeStatus::Done,
            scope,
        }
    }
}
