//! The frozen result of one resolution run.

use crate::cache::SourceCache;
use crate::key::RetrievalKey;
use crate::unit::SourceUnit;
use crate::unit_id::UnitId;
use solfetch_common::{InternalError, SolfetchResult};

/// A fully populated, read-only dependency graph rooted at an entry file.
///
/// A `ResolvedGraph` can only be built from a finished [`SourceCache`], and it
/// exposes no way to add units. Everything downstream of resolution (the
/// compiler bridge, diagnostics rendering, source listings) reads from it.
#[derive(Debug)]
pub struct ResolvedGraph {
    cache: SourceCache,
    entry: UnitId,
}

impl ResolvedGraph {
    /// Freezes `cache`, recording `entry` as the root of the graph.
    ///
    /// Fails if the entry key was never inserted.
    pub fn new(cache: SourceCache, entry: &RetrievalKey) -> SolfetchResult<Self> {
        let entry = cache
            .unit(entry)
            .map(|unit| unit.id)
            .ok_or_else(|| InternalError::new(format!("entry {entry} missing from resolved graph")))?;
        Ok(Self { cache, entry })
    }

    /// Returns the entry unit.
    pub fn entry(&self) -> &SourceUnit {
        self.cache.get(self.entry)
    }

    /// Looks up a path the way the compiler requests it. See [`SourceCache::lookup`].
    pub fn lookup(&self, path: &str) -> Option<&SourceUnit> {
        self.cache.lookup(path)
    }

    /// Returns the unit stored under `key`.
    pub fn unit(&self, key: &RetrievalKey) -> Option<&SourceUnit> {
        self.cache.unit(key)
    }

    /// Iterates over all units in first-discovery order.
    pub fn units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.cache.iter()
    }

    /// Returns the number of units in the graph.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if the graph holds no units. Never the case for a built graph.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the underlying cache for read-only use.
    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }
}
