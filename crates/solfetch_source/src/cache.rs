//! The dependency graph cache populated during one resolution run.

use crate::key::{KeyError, RetrievalKey};
use crate::span::{ResolvedSpan, Span};
use crate::unit::SourceUnit;
use crate::unit_id::UnitId;
use std::collections::{HashMap, HashSet};

/// Mapping from retrieval key to finalized source unit.
///
/// The cache is the single source of truth for "has this file been
/// resolved". It only grows: units are never replaced or evicted. Keys are
/// claimed before they are fetched so that concurrent branches of one
/// resolution never fetch or substitute the same file twice.
#[derive(Debug, Default)]
pub struct SourceCache {
    units: Vec<SourceUnit>,
    index: HashMap<String, UnitId>,
    claimed: HashSet<RetrievalKey>,
    aliases: HashMap<String, RetrievalKey>,
}

impl SourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as being resolved.
    ///
    /// Returns `true` if the caller now owns the key and must fetch it, or
    /// `false` if another branch already claimed or inserted it.
    pub fn claim(&mut self, key: &RetrievalKey) -> bool {
        if self.index.contains_key(key.as_str()) {
            return false;
        }
        self.claimed.insert(key.clone())
    }

    /// Returns `true` if `key` has been claimed or inserted.
    pub fn is_claimed(&self, key: &RetrievalKey) -> bool {
        self.claimed.contains(key) || self.index.contains_key(key.as_str())
    }

    /// Inserts a finalized unit and returns its id.
    ///
    /// If the key is already present the existing unit is kept untouched and
    /// its id is returned; the first inserted text is authoritative.
    pub fn insert(
        &mut self,
        key: RetrievalKey,
        content: String,
        imports: Vec<RetrievalKey>,
    ) -> UnitId {
        if let Some(&id) = self.index.get(key.as_str()) {
            return id;
        }
        let id = UnitId::from_raw(self.units.len() as u32);
        self.index.insert(key.as_str().to_string(), id);
        self.claimed.insert(key.clone());
        self.units.push(SourceUnit::new(id, key, content, imports));
        id
    }

    /// Parses `location` and inserts `content` with no recorded imports.
    ///
    /// Convenient for building caches by hand in tests.
    pub fn add_source(
        &mut self,
        location: &str,
        content: impl Into<String>,
    ) -> Result<UnitId, KeyError> {
        let key = RetrievalKey::parse(location)?;
        Ok(self.insert(key, content.into(), Vec::new()))
    }

    /// Records that the compiler may request `key` under the literal name `name`.
    ///
    /// The first mapping for a name wins. Returns `false` if `name` was
    /// already mapped to a different key.
    pub fn add_alias(&mut self, name: impl Into<String>, key: RetrievalKey) -> bool {
        let name = name.into();
        match self.aliases.get(&name) {
            Some(existing) => *existing == key,
            None => {
                self.aliases.insert(name, key);
                true
            }
        }
    }

    /// Returns `true` if a unit is stored under `key`.
    pub fn contains(&self, key: &RetrievalKey) -> bool {
        self.index.contains_key(key.as_str())
    }

    /// Returns the unit with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this cache.
    pub fn get(&self, id: UnitId) -> &SourceUnit {
        &self.units[id.index()]
    }

    /// Returns the unit stored under `key`.
    pub fn unit(&self, key: &RetrievalKey) -> Option<&SourceUnit> {
        self.index.get(key.as_str()).map(|&id| self.get(id))
    }

    /// Looks up a path as the compiler requests it.
    ///
    /// Tries the path verbatim as a key, then as a recorded alias, then in
    /// canonical URL form. Never performs I/O.
    pub fn lookup(&self, path: &str) -> Option<&SourceUnit> {
        if let Some(&id) = self.index.get(path) {
            return Some(self.get(id));
        }
        if let Some(key) = self.aliases.get(path) {
            return self.unit(key);
        }
        RetrievalKey::parse(path).ok().and_then(|key| self.unit(&key))
    }

    /// Returns the number of stored units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no unit has been stored.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterates over units in first-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.iter()
    }

    /// Iterates over recorded aliases as `(name, key)` pairs.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &RetrievalKey)> {
        self.aliases.iter().map(|(name, key)| (name.as_str(), key))
    }

    /// Resolves a [`Span`] to line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let unit = self.get(span.unit);
        let (start_line, start_col) = unit.line_col(span.start);
        let (end_line, end_col) = unit.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            source: unit.key.to_string(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the source text covered by a [`Span`].
    pub fn snippet(&self, span: Span) -> &str {
        self.get(span.unit).snippet(span.start, span.end)
    }

    /// Finds an import cycle among the stored units, if one exists.
    ///
    /// The returned chain starts and ends with the same key. Imports of keys
    /// that were never stored are ignored.
    pub fn find_cycle(&self) -> Option<Vec<RetrievalKey>> {
        let mut state = vec![VisitState::New; self.units.len()];
        let mut stack = Vec::new();
        for unit in &self.units {
            if state[unit.id.index()] == VisitState::New {
                if let Some(cycle) = self.walk_for_cycle(unit.id, &mut state, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn walk_for_cycle(
        &self,
        id: UnitId,
        state: &mut [VisitState],
        stack: &mut Vec<UnitId>,
    ) -> Option<Vec<RetrievalKey>> {
        state[id.index()] = VisitState::OnStack;
        stack.push(id);
        for import in &self.get(id).imports {
            let Some(&child) = self.index.get(import.as_str()) else {
                continue;
            };
            match state[child.index()] {
                VisitState::OnStack => {
                    let from = stack.iter().position(|&s| s == child).unwrap_or(0);
                    let mut cycle: Vec<RetrievalKey> =
                        stack[from..].iter().map(|&s| self.get(s).key.clone()).collect();
                    cycle.push(self.get(child).key.clone());
                    return Some(cycle);
                }
                VisitState::New => {
                    if let Some(cycle) = self.walk_for_cycle(child, state, stack) {
                        return Some(cycle);
                    }
                }
                VisitState::Done => {}
            }
        }
        stack.pop();
        state[id.index()] = VisitState::Done;
        None
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    New,
    OnStack,
    Done,
}
