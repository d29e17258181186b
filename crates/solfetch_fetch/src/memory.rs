//! An in-memory fetcher for tests and offline runs.

use crate::error::FetchError;
use crate::fetcher::{normalize_text, Fetcher};
use async_trait::async_trait;
use solfetch_source::RetrievalKey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

enum Entry {
    Text(String),
    Status(u16),
}

/// Serves a fixed set of locations from memory and records every request.
///
/// Unknown locations answer with status 404. Each fetch yields to the
/// scheduler once, so concurrent resolutions genuinely interleave, and the
/// highest number of simultaneous fetches is recorded.
#[derive(Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Entry>,
    counts: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `text` at `location`.
    pub fn with_file(mut self, location: &str, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }

    /// Answers requests for `location` with an error status.
    pub fn with_status(mut self, location: &str, status: u16) -> Self {
        self.entries
            .insert(canonical(location), Entry::Status(status));
        self
    }

    /// Serves `text` at `location`, replacing anything registered before.
    pub fn insert(&mut self, location: &str, text: impl Into<String>) {
        self.entries
            .insert(canonical(location), Entry::Text(text.into()));
    }

    /// Returns how many times `location` was requested.
    pub fn fetch_count(&self, location: &str) -> usize {
        self.counts()
            .get(&canonical(location))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the total number of requests served.
    pub fn total_fetches(&self) -> usize {
        self.counts().values().sum()
    }

    /// Returns the highest number of fetches that were in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn counts(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, key: &RetrievalKey) -> Result<String, FetchError> {
        *self.counts().entry(key.to_string()).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.entries.get(key.as_str()) {
            Some(Entry::Text(text)) => Ok(normalize_text(text.clone())),
            Some(Entry::Status(status)) => Err(FetchError::Status {
                key: key.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                key: key.to_string(),
                status: 404,
            }),
        }
    }
}

/// Registered locations are stored in canonical key form so that lookups
/// match whatever the resolver computes.
fn canonical(location: &str) -> String {
    RetrievalKey::parse(location)
        .map(|key| key.to_string())
        .unwrap_or_else(|_| location.to_string())
}
