//! The recursive fetch, substitute and extract pipeline.
//!
//! Every visit claims its key in the shared [`SourceCache`] before fetching,
//! so a file reachable along several import paths is fetched and substituted
//! exactly once. Siblings are visited with bounded fan-out; with the default
//! width of one the traversal is a plain sequential depth-first walk.
//!
//! The cache lock is only ever held for short synchronous sections and never
//! across a fetch.

use crate::error::ResolveError;
use crate::imports::extract_imports;
use crate::params::ParameterSet;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use solfetch_common::InternalError;
use solfetch_fetch::Fetcher;
use solfetch_source::{is_bare_specifier, resolve_specifier, ResolvedGraph, RetrievalKey, SourceCache};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Knobs for one resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of fetches in flight at once. `1` resolves strictly
    /// one file at a time.
    pub max_concurrent_fetches: usize,
    /// Accept import cycles instead of failing with
    /// [`ResolveError::CyclicImport`]. Each file in a cycle is still fetched
    /// once.
    pub allow_cyclic_imports: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 1,
            allow_cyclic_imports: false,
        }
    }
}

/// Resolves the import graph reachable from one entry file.
///
/// A resolver owns the cache for exactly one run; [`resolve`](Self::resolve)
/// consumes it and returns the frozen graph.
pub struct Resolver<'f> {
    fetcher: &'f dyn Fetcher,
    params: ParameterSet,
    options: ResolveOptions,
    cache: Mutex<SourceCache>,
    permits: Semaphore,
}

impl<'f> Resolver<'f> {
    /// Creates a resolver with no parameters.
    pub fn new(fetcher: &'f dyn Fetcher, options: ResolveOptions) -> Self {
        let width = options.max_concurrent_fetches.max(1);
        Self {
            fetcher,
            params: ParameterSet::default(),
            options: ResolveOptions {
                max_concurrent_fetches: width,
                ..options
            },
            cache: Mutex::new(SourceCache::new()),
            permits: Semaphore::new(width),
        }
    }

    /// Uses `params` for placeholder substitution.
    pub fn with_parameters(mut self, params: ParameterSet) -> Self {
        self.params = params;
        self
    }

    /// Parses `text` as the parameter document.
    ///
    /// A document that does not parse disables substitution for the run.
    pub fn with_parameter_text(self, text: &str) -> Self {
        self.with_parameters(ParameterSet::parse_lenient(text))
    }

    /// Fetches the parameter document from `location` and uses it.
    ///
    /// Failing to retrieve the document aborts; failing to parse it does not.
    pub async fn load_parameters(self, location: &RetrievalKey) -> Result<Self, ResolveError> {
        debug!(%location, "fetching parameter document");
        let text = self.fetcher.fetch(location).await?;
        Ok(self.with_parameter_text(&text))
    }

    /// Returns the parameters in effect.
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Fetches everything reachable from `root` and freezes the result.
    ///
    /// Nothing is returned until the whole graph is in the cache. Any fetch
    /// failure, unresolvable import or (unless allowed) cycle aborts the run
    /// and discards the partial cache.
    pub async fn resolve(self, root: &RetrievalKey) -> Result<ResolvedGraph, ResolveError> {
        info!(%root, width = self.options.max_concurrent_fetches, "resolving import graph");
        self.visit(root.clone(), Vec::new()).await?;

        let cache = self
            .cache
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        if !self.options.allow_cyclic_imports {
            if let Some(cycle) = cache.find_cycle() {
                return Err(cyclic(cycle));
            }
        }

        let graph = ResolvedGraph::new(cache, root)?;
        info!(files = graph.len(), "import graph resolved");
        Ok(graph)
    }

    fn visit<'a>(
        &'a self,
        key: RetrievalKey,
        ancestors: Vec<RetrievalKey>,
    ) -> BoxFuture<'a, Result<(), ResolveError>> {
        async move {
            if !self.cache().claim(&key) {
                return Ok(());
            }

            let raw = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|e| InternalError::new(format!("fetch limiter closed: {e}")))?;
                debug!(%key, "fetching");
                self.fetcher.fetch(&key).await?
            };
            let content = self.params.apply(raw);

            let base = key.parent_dir();
            let mut imports: Vec<RetrievalKey> = Vec::new();
            for specifier in extract_imports(&content) {
                let child = resolve_specifier(&specifier, &base)?;
                if is_bare_specifier(&specifier)
                    && !self.cache().add_alias(specifier.as_str(), child.clone())
                {
                    warn!(%specifier, %child, "import name already maps to another file");
                }
                if !imports.contains(&child) {
                    imports.push(child);
                }
            }

            let mut chain = ancestors;
            chain.push(key.clone());

            let mut pending = Vec::new();
            for child in &imports {
                if chain.contains(child) {
                    if self.options.allow_cyclic_imports {
                        debug!(%key, %child, "following cyclic import lazily");
                        continue;
                    }
                    let from = chain.iter().position(|k| k == child).unwrap_or(0);
                    let mut cycle = chain[from..].to_vec();
                    cycle.push(child.clone());
                    return Err(cyclic(cycle));
                }
                pending.push(child.clone());
            }

            debug!(%key, imports = imports.len(), "resolved");
            self.cache().insert(key, content, imports);

            let pending: Vec<RetrievalKey> = {
                let cache = self.cache();
                pending.into_iter().filter(|k| !cache.is_claimed(k)).collect()
            };

            stream::iter(pending.into_iter().map(|child| self.visit(child, chain.clone())))
                .buffer_unordered(self.options.max_concurrent_fetches)
                .try_collect::<()>()
                .await
        }
        .boxed()
    }

    fn cache(&self) -> MutexGuard<'_, SourceCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn cyclic(chain: Vec<RetrievalKey>) -> ResolveError {
    let key = chain.first().map(|k| k.to_string()).unwrap_or_default();
    ResolveError::CyclicImport {
        key,
        chain: chain.iter().map(|k| k.to_string()).collect(),
    }
}

/// Resolves the graph reachable from `root` in one call.
///
/// `parameter_text` is the raw parameter document, if any.
pub async fn resolve(
    fetcher: &dyn Fetcher,
    root: &RetrievalKey,
    parameter_text: Option<&str>,
    options: ResolveOptions,
) -> Result<ResolvedGraph, ResolveError> {
    let mut resolver = Resolver::new(fetcher, options);
    if let Some(text) = parameter_text {
        resolver = resolver.with_parameter_text(text);
    }
    resolver.resolve(root).await
}
