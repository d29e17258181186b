//! The fetcher abstraction used by the resolver.

use crate::error::FetchError;
use async_trait::async_trait;
use solfetch_source::RetrievalKey;

/// Retrieves the raw text stored at a retrieval key.
///
/// Implementations must return text already passed through
/// [`normalize_text`], must not retry on their own, and must treat any
/// non-success response as a [`FetchError`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the text at `key`.
    async fn fetch(&self, key: &RetrievalKey) -> Result<String, FetchError>;
}

/// Strips trailing whitespace in place.
///
/// Placeholder and import scanning is text-anchored, so every fetcher
/// normalizes the same way.
pub fn normalize_text(mut text: String) -> String {
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    text
}
