//! The synchronous import callback handed to the compiler.
//!
//! An [`ImportBridge`] can only be built from a [`ResolvedGraph`], so by
//! construction every request it answers is served from a graph that has
//! finished resolving. It never performs I/O and never blocks.

use serde::{Deserialize, Serialize};
use solfetch_source::ResolvedGraph;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Message returned for paths absent from the graph.
pub const NOT_FOUND: &str = "File not found";

/// The answer to one import request: `{"contents": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportResponse {
    /// The requested file's finalized text.
    Contents(String),
    /// Why the file could not be supplied.
    Error(String),
}

impl ImportResponse {
    /// Returns the contents on a hit.
    pub fn contents(&self) -> Option<&str> {
        match self {
            ImportResponse::Contents(text) => Some(text),
            ImportResponse::Error(_) => None,
        }
    }

    /// Returns `true` for an error response.
    pub fn is_error(&self) -> bool {
        matches!(self, ImportResponse::Error(_))
    }
}

/// Something that can answer a compiler's import requests synchronously.
pub trait ImportResolver {
    /// Returns the contents for `path`, or an error response.
    fn resolve_import(&self, path: &str) -> ImportResponse;
}

/// One request served by an [`ImportBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// The path exactly as the compiler asked for it.
    pub path: String,
    /// The key it was served from, on a hit.
    pub served_from: Option<String>,
}

/// Serves import requests from a frozen [`ResolvedGraph`].
#[derive(Debug)]
pub struct ImportBridge<'g> {
    graph: &'g ResolvedGraph,
    requests: Mutex<Vec<ImportRequest>>,
}

impl<'g> ImportBridge<'g> {
    /// Creates a bridge over `graph`.
    pub fn new(graph: &'g ResolvedGraph) -> Self {
        Self {
            graph,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the graph this bridge reads from.
    pub fn graph(&self) -> &'g ResolvedGraph {
        self.graph
    }

    /// Returns every request served so far, in order.
    pub fn requests(&self) -> Vec<ImportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the paths that could not be served.
    pub fn misses(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.served_from.is_none())
            .map(|r| r.path)
            .collect()
    }
}

impl ImportResolver for ImportBridge<'_> {
    fn resolve_import(&self, path: &str) -> ImportResponse {
        let unit = self.graph.lookup(path);
        debug!(path, hit = unit.is_some(), "import requested");
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ImportRequest {
                path: path.to_string(),
                served_from: unit.map(|u| u.key.to_string()),
            });
        match unit {
            Some(unit) => ImportResponse::Contents(unit.content.clone()),
            None => ImportResponse::Error(NOT_FOUND.to_string()),
        }
    }
}
