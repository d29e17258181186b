//! Opaque identifier for source units stored in a [`SourceCache`](crate::SourceCache).

use serde::{Deserialize, Serialize};

/// Index of a source unit within one resolution run.
///
/// Ids are handed out in first-discovery order, so the entry file is always
/// `UnitId(0)` for a graph produced by the resolver.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a `UnitId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `UnitId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        assert_eq!(UnitId::from_raw(3).as_raw(), 3);
        assert_eq!(UnitId::from_raw(3).index(), 3);
    }

    #[test]
    fn ordered_by_discovery() {
        assert!(UnitId::from_raw(0) < UnitId::from_raw(1));
    }
}
