//! Byte ranges inside resolved source units.

use crate::unit_id::UnitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte offset range inside one source unit (`start` inclusive, `end` exclusive).
///
/// Compiler diagnostics report locations as `(source name, start, end)`;
/// once the source name is looked up in the graph the location becomes a `Span`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The unit this span belongs to.
    pub unit: UnitId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// Creates a new span in the given unit.
    pub fn new(unit: UnitId, start: u32, end: u32) -> Self {
        Self {
            unit,
            start,
            end: end.max(start),
        }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A span converted to 1-indexed line/column coordinates for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSpan {
    /// The source unit name (its retrieval key).
    pub source: String,
    /// Line of the first byte.
    pub start_line: u32,
    /// Column of the first byte.
    pub start_col: u32,
    /// Line of the last byte.
    pub end_line: u32,
    /// Column of the last byte.
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.start_line, self.start_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_range_collapses() {
        let s = Span::new(UnitId::from_raw(0), 10, 4);
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn length() {
        let s = Span::new(UnitId::from_raw(1), 4, 12);
        assert_eq!(s.len(), 8);
        assert!(!s.is_empty());
    }

    #[test]
    fn resolved_display() {
        let r = ResolvedSpan {
            source: "https://host/A.sol".to_string(),
            start_line: 3,
            start_col: 7,
            end_line: 3,
            end_col: 9,
        };
        assert_eq!(r.to_string(), "https://host/A.sol:3:7");
    }
}
