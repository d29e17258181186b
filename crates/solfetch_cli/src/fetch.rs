//! `solfetch fetch`: resolve the import graph without compiling.
//!
//! Prints one line per resolved file, or with `--out DIR` writes every
//! substituted source under `DIR/<host>/<path>`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use solfetch_source::{ResolvedGraph, RetrievalKey};

use crate::pipeline::{load_project_config, plan, resolve_graph};
use crate::{FetchArgs, GlobalArgs, ReportFormat};

/// One row of the JSON listing.
#[derive(Serialize)]
struct UnitListing<'g> {
    key: &'g str,
    bytes: usize,
    hash: String,
    imports: Vec<&'g str>,
}

/// Runs the `solfetch fetch` command.
pub fn run(args: &FetchArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_project_config(global)?;
    let plan = plan(&args.resolve, config.as_ref())?;
    let graph = resolve_graph(&plan)?;

    if let Some(ref out) = args.out {
        let written = write_sources(&graph, Path::new(out))?;
        if !global.quiet {
            eprintln!("   Wrote {} file(s) under {out}", written.len());
        }
    }

    match args.format {
        ReportFormat::Text => print!("{}", format_listing(&graph)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&listing(&graph))?),
    }
    Ok(0)
}

fn listing(graph: &ResolvedGraph) -> Vec<UnitListing<'_>> {
    graph
        .units()
        .map(|unit| UnitListing {
            key: unit.key.as_str(),
            bytes: unit.content.len(),
            hash: unit.content_hash.to_string(),
            imports: unit.imports.iter().map(RetrievalKey::as_str).collect(),
        })
        .collect()
}

fn format_listing(graph: &ResolvedGraph) -> String {
    graph
        .units()
        .map(|unit| {
            format!(
                "{}  {:>8}  {}\n",
                unit.content_hash.short(),
                unit.content.len(),
                unit.key
            )
        })
        .collect()
}

/// Maps a key onto a relative output path: `<host>[_<port>]/<path segments>`.
///
/// Explicit non-default ports are part of the directory name so that two
/// servers on the same host never write to the same file.
fn output_path(key: &RetrievalKey) -> PathBuf {
    let url = key.as_url();
    let host = url.host_str().filter(|h| !h.is_empty()).unwrap_or("localhost");
    let mut path = match url.port() {
        Some(port) => PathBuf::from(format!("{host}_{port}")),
        None => PathBuf::from(host),
    };
    if let Some(segments) = url.path_segments() {
        for segment in segments.filter(|s| !s.is_empty() && *s != "." && *s != "..") {
            path.push(segment);
        }
    }
    path
}

/// Writes every unit of `graph` under `dir`. Returns the written paths.
fn write_sources(graph: &ResolvedGraph, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut written = Vec::with_capacity(graph.len());
    for unit in graph.units() {
        let path = dir.join(output_path(&unit.key));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &unit.content)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solfetch_source::SourceCache;
    use tempfile::TempDir;

    fn graph() -> ResolvedGraph {
        let mut cache = SourceCache::new();
        let b = RetrievalKey::parse("https://host/lib/B.sol").unwrap();
        cache.insert(
            RetrievalKey::parse("https://host/A.sol").unwrap(),
            "import \"./lib/B.sol\";".to_string(),
            vec![b.clone()],
        );
        cache.insert(b, "contract B {}".to_string(), Vec::new());
        ResolvedGraph::new(cache, &RetrievalKey::parse("https://host/A.sol").unwrap()).unwrap()
    }

    #[test]
    fn output_paths_mirror_urls() {
        let key = RetrievalKey::parse("https://host/contracts/zksync/Executor.sol").unwrap();
        assert_eq!(
            output_path(&key),
            PathBuf::from("host").join("contracts").join("zksync").join("Executor.sol")
        );
        let local = RetrievalKey::parse("file:///tmp/A.sol").unwrap();
        assert_eq!(
            output_path(&local),
            PathBuf::from("localhost").join("tmp").join("A.sol")
        );
    }

    #[test]
    fn ports_keep_servers_apart() {
        let a = RetrievalKey::parse("http://h:8080/A.sol").unwrap();
        let b = RetrievalKey::parse("http://h:9090/A.sol").unwrap();
        assert_eq!(output_path(&a), PathBuf::from("h_8080").join("A.sol"));
        assert_eq!(output_path(&b), PathBuf::from("h_9090").join("A.sol"));

        // A default port is dropped by the URL parser, like no port at all.
        let default = RetrievalKey::parse("https://h:443/A.sol").unwrap();
        assert_eq!(output_path(&default), PathBuf::from("h").join("A.sol"));
    }

    #[test]
    fn writes_every_unit() {
        let tmp = TempDir::new().unwrap();
        let written = write_sources(&graph(), tmp.path()).unwrap();
        assert_eq!(written.len(), 2);
        let b = std::fs::read_to_string(tmp.path().join("host/lib/B.sol")).unwrap();
        assert_eq!(b, "contract B {}");
        assert!(tmp.path().join("host/A.sol").is_file());
    }

    #[test]
    fn listing_in_discovery_order() {
        let graph = graph();
        let rows = listing(&graph);
        assert_eq!(rows[0].key, "https://host/A.sol");
        assert_eq!(rows[0].imports, vec!["https://host/lib/B.sol"]);
        assert_eq!(rows[1].bytes, "contract B {}".len());

        let text = format_listing(&graph);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().ends_with("https://host/lib/B.sol"));
    }
}
