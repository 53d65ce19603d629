use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a source file known to the debugger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new<S: Into<Arc<str>>>(id: S) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A position within a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub source_id: SourceId,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl SourceLocation {
    pub fn new(source_id: impl Into<SourceId>, line: u32, column: u32) -> Self {
        Self {
            source_id: source_id.into(),
            line,
            column,
        }
    }
}

/// A location in both its original and generated (compiled/bundled) source.
///
/// Stepping guards compare mapped locations so a step-over never reports a
/// stop at the very location it started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedLocation {
    pub location: SourceLocation,
    pub generated_location: SourceLocation,
}
