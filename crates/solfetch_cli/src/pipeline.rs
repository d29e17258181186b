//! Shared pipeline helpers for CLI commands.
//!
//! Contains the steps `build` and `fetch` have in common: locating and
//! loading `solfetch.toml`, merging command-line flags over it, and running
//! the resolver to completion on a single-threaded runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use solfetch_config::{SolfetchConfig, CONFIG_FILE_NAME};
use solfetch_diagnostics::{DiagnosticRenderer, DiagnosticSink, JsonRenderer, TerminalRenderer};
use solfetch_fetch::UrlFetcher;
use solfetch_resolve::{ResolveOptions, Resolver};
use solfetch_source::{ResolvedGraph, RetrievalKey};

use crate::{GlobalArgs, ReportFormat, ResolveArgs};

/// Everything needed to run one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvePlan {
    /// The entry file.
    pub entry: RetrievalKey,
    /// Location of the parameter document, if any.
    pub parameters: Option<RetrievalKey>,
    /// Resolver knobs.
    pub options: ResolveOptions,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// Walks up from `start` looking for the nearest `solfetch.toml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads the configuration named by `--config`, or the nearest `solfetch.toml`.
///
/// An explicit `--config` that cannot be loaded is an error; finding no file
/// while searching is not.
pub fn load_project_config(
    global: &GlobalArgs,
) -> Result<Option<SolfetchConfig>, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        let config = if p.is_dir() {
            solfetch_config::load_config(&p)?
        } else {
            solfetch_config::load_config_file(&p)?
        };
        return Ok(Some(config));
    }
    match find_config(&std::env::current_dir()?) {
        Some(path) => Ok(Some(solfetch_config::load_config_file(&path)?)),
        None => Ok(None),
    }
}

/// Parses an entry or parameter location given on the command line.
///
/// Absolute URLs are used as-is; anything else is treated as a local path
/// and turned into a `file://` location.
pub fn parse_location(input: &str) -> Result<RetrievalKey, Box<dyn std::error::Error>> {
    if let Ok(key) = RetrievalKey::parse(input) {
        if key.scheme().len() > 1 {
            return Ok(key);
        }
    }
    let path = Path::new(input);
    let absolute = std::fs::canonicalize(path)
        .map_err(|e| format!("cannot use '{input}' as a location: {e}"))?;
    Ok(RetrievalKey::from_file_path(&absolute)?)
}

/// Merges command-line flags over the configuration file.
pub fn plan(
    args: &ResolveArgs,
    config: Option<&SolfetchConfig>,
) -> Result<ResolvePlan, Box<dyn std::error::Error>> {
    let entry = match (&args.entry, config) {
        (Some(entry), _) => parse_location(entry)?,
        (None, Some(config)) => RetrievalKey::parse(&config.source.entry)?,
        (None, None) => {
            return Err(format!(
                "no entry file given and no {CONFIG_FILE_NAME} found in this directory or any parent"
            )
            .into())
        }
    };

    let parameters = match (&args.params, config.and_then(|c| c.source.parameters.as_ref())) {
        (Some(p), _) => Some(parse_location(p)?),
        (None, Some(p)) => Some(RetrievalKey::parse(p)?),
        (None, None) => None,
    };

    let resolver = config.map(|c| c.resolver.clone()).unwrap_or_default();
    let max_concurrent_fetches = args.jobs.unwrap_or(resolver.max_concurrent_fetches);
    if max_concurrent_fetches == 0 {
        return Err("--jobs must be at least 1".into());
    }

    Ok(ResolvePlan {
        entry,
        parameters,
        options: ResolveOptions {
            max_concurrent_fetches,
            allow_cyclic_imports: args.allow_cycles || resolver.allow_cyclic_imports,
        },
        timeout: resolver.request_timeout_secs.map(Duration::from_secs),
    })
}

/// Runs the resolver for `plan` to completion.
pub fn resolve_graph(plan: &ResolvePlan) -> Result<ResolvedGraph, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let fetcher = UrlFetcher::with_timeout(plan.timeout)?;

    let graph = runtime.block_on(async {
        let mut resolver = Resolver::new(&fetcher, plan.options);
        if let Some(ref params) = plan.parameters {
            resolver = resolver.load_parameters(params).await?;
        }
        resolver.resolve(&plan.entry).await
    })?;
    Ok(graph)
}

/// Renders all diagnostics from a sink to stderr.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(
    sink: &DiagnosticSink,
    graph: &ResolvedGraph,
    format: ReportFormat,
    color: bool,
) -> usize {
    let diagnostics = sink.diagnostics();
    let renderer: Box<dyn DiagnosticRenderer> = match format {
        ReportFormat::Text => Box::new(TerminalRenderer::new(color)),
        ReportFormat::Json => Box::new(JsonRenderer),
    };
    for diag in &diagnostics {
        eprintln!("{}", renderer.render(diag, graph.cache()));
    }
    diagnostics.len()
}
