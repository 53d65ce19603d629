use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{SourceId, SourceLocation};

/// Identifier of a single call-stack frame, scoped to one pause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(Arc<str>);

impl FrameId {
    pub fn new<S: Into<Arc<str>>>(id: S) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FrameId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One entry in a paused thread's call stack, as reported by the replay
/// backend. Frames arrive ordered innermost first; index 0 is the top frame.
///
/// `alternate_location` points into an alternate representation of the same
/// source (e.g. pretty-printed vs. minified) when the backend knows of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: FrameId,
    pub location: SourceLocation,
    pub generated_location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_location: Option<SourceLocation>,
}

impl Frame {
    pub fn new(id: impl Into<FrameId>, location: SourceLocation) -> Self {
        Self {
            id: id.into(),
            generated_location: location.clone(),
            location,
            alternate_location: None,
        }
    }

    pub fn with_generated(mut self, generated: SourceLocation) -> Self {
        self.generated_location = generated;
        self
    }

    pub fn with_alternate(mut self, alternate: SourceLocation) -> Self {
        self.alternate_location = Some(alternate);
        self
    }

    /// The id of the alternate source this frame can be viewed in, if any.
    pub fn alternate_source_id(&self) -> Option<&SourceId> {
        self.alternate_location.as_ref().map(|l| &l.source_id)
    }
}
