//! Content hashing for resolved source units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 hash of a source unit's finalized text.
///
/// Two units with equal hashes are treated as having identical text. The
/// hash is taken after parameter substitution, so the same upstream file
/// fetched with different parameter documents hashes differently.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Hashes the UTF-8 bytes of a string.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Returns the first 12 hex characters, enough to tell units apart in listings.
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_hash() {
        let a = ContentHash::from_text("contract A {}");
        let b = ContentHash::from_bytes(b"contract A {}");
        assert_eq!(a, b);
    }

    #[test]
    fn substituted_text_differs() {
        let raw = ContentHash::from_text("uint x = $(FOO);");
        let done = ContentHash::from_text("uint x = 42;");
        assert_ne!(raw, done);
    }

    #[test]
    fn display_is_full_hex() {
        let s = ContentHash::from_text("x").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn short_is_prefix_of_display() {
        let h = ContentHash::from_text("pragma solidity ^0.8.0;");
        assert_eq!(h.short().len(), 12);
        assert!(h.to_string().starts_with(&h.short()));
        assert_eq!(format!("{h:?}"), format!("ContentHash({})", h.short()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_text("serde");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
