use std::{cmp::Ordering, hash::Hash, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{Error, SourceLocation};

/// A moment in a recorded execution.
///
/// Execution points are monotonically increasing logical timestamps produced
/// by the replay backend, serialized as decimal digit strings of unbounded
/// width. Recorded points routinely exceed the 53-bit safe-integer range, so
/// they are never parsed into a float or compared lexically; ordering is
/// numeric over the digit string (leading zeros stripped, longer run of
/// digits wins, ties broken byte-wise).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionPoint(Arc<str>);

impl ExecutionPoint {
    /// Validate and wrap a backend-provided point.
    pub fn new<S: AsRef<str>>(point: S) -> crate::Result<Self> {
        let s = point.as_ref();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPoint(s.to_string()));
        }
        Ok(Self(Arc::from(s)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The significant digits, with leading zeros stripped. Empty for zero.
    fn digits(&self) -> &str {
        self.0.trim_start_matches('0')
    }
}

impl Ord for ExecutionPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.digits(), other.digits());
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl PartialOrd for ExecutionPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ExecutionPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExecutionPoint {}

impl Hash for ExecutionPoint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.digits().hash(state);
    }
}

impl std::fmt::Display for ExecutionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ExecutionPoint {
    type Error = Error;
    fn try_from(s: String) -> crate::Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ExecutionPoint {
    type Error = Error;
    fn try_from(s: &str) -> crate::Result<Self> {
        Self::new(s)
    }
}

impl From<ExecutionPoint> for String {
    fn from(p: ExecutionPoint) -> Self {
        p.0.to_string()
    }
}

/// One entry of a frame-position reply: an execution point visited within
/// the current frame stack, with the source location it maps to when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPosition {
    pub point: ExecutionPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// Execution points recorded for a thread's current frame stack, split into
/// positions that were visited and positions that were never executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePositions {
    pub positions: Vec<PointPosition>,
    #[serde(default)]
    pub unexecuted: Vec<PointPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(s: &str) -> ExecutionPoint {
        ExecutionPoint::new(s).unwrap()
    }

    #[test]
    fn test_rejects_non_digit_input() {
        assert!(ExecutionPoint::new("").is_err());
        assert!(ExecutionPoint::new("12a4").is_err());
        assert!(ExecutionPoint::new("-5").is_err());
        assert!(ExecutionPoint::new("1.5").is_err());
    }

    #[test]
    fn test_orders_numerically_not_lexically() {
        // A lexical comparison would put "10…" before "99…"; a float
        // comparison would collapse both to the same value.
        let small = point("9999999999999999999");
        let large = point("10000000000000000000");
        assert!(large > small);
        assert!(small < large);
    }

    #[test]
    fn test_leading_zeros_do_not_affect_order() {
        assert_eq!(point("007"), point("7"));
        assert!(point("0100") > point("99"));
        assert_eq!(point("000"), point("0"));
    }

    #[test]
    fn test_equal_length_compares_bytewise() {
        assert!(point("123456789") < point("123456790"));
        assert_eq!(point("42"), point("42"));
    }

    #[test]
    fn test_serde_round_trip() {
        let p: ExecutionPoint = serde_json::from_str("\"18446744073709551617\"").unwrap();
        assert_eq!(p.as_str(), "18446744073709551617");
        assert!(serde_json::from_str::<ExecutionPoint>("\"12x\"").is_err());
    }
}
