//! Finalized source units with line-start indexing for diagnostics.

use crate::key::RetrievalKey;
use crate::unit_id::UnitId;
use solfetch_common::ContentHash;

/// One resolved source file: its key, post-substitution text and the keys it imports.
///
/// Units are immutable once inserted into the [`SourceCache`](crate::SourceCache);
/// parameter substitution happens exactly once, before insertion.
#[derive(Debug)]
pub struct SourceUnit {
    /// The identifier of this unit within its cache.
    pub id: UnitId,
    /// The canonical location the text was fetched from.
    pub key: RetrievalKey,
    /// The finalized text after parameter substitution.
    pub content: String,
    /// Keys of the files this unit imports, in source order.
    pub imports: Vec<RetrievalKey>,
    /// Hash of the finalized text.
    pub content_hash: ContentHash,
    line_starts: Vec<u32>,
}

impl SourceUnit {
    /// Creates a unit, precomputing its line starts and content hash.
    pub fn new(id: UnitId, key: RetrievalKey, content: String, imports: Vec<RetrievalKey>) -> Self {
        let line_starts = compute_line_starts(&content);
        let content_hash = ContentHash::from_text(&content);
        Self {
            id,
            key,
            content,
            imports,
            content_hash,
            line_starts,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    ///
    /// Offsets past the end of the text are clamped to the last byte.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let offset = byte_offset.min(self.content.len() as u32);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns the full text of the line containing `byte_offset`, without its newline.
    pub fn line_text(&self, byte_offset: u32) -> &str {
        let mut offset = (byte_offset as usize).min(self.content.len());
        while !self.content.is_char_boundary(offset) {
            offset -= 1;
        }
        let start = self.content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |pos| offset + pos);
        &self.content[start..end]
    }

    /// Returns the text between two byte offsets, clamped to the unit's length.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        let len = self.content.len();
        let start = (start as usize).min(len);
        let end = (end as usize).clamp(start, len);
        self.content.get(start..end).unwrap_or("")
    }

    /// Returns the number of lines in the unit.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}
