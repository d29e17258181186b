//! `solfetch build`: resolve, compile and print an artifact.
//!
//! 1. Load `solfetch.toml` (if any) and merge flags over it
//! 2. Resolve the whole import graph
//! 3. Compile the entry file with `solc`, serving imports from the graph
//! 4. Render compiler diagnostics
//! 5. Print the selected contract's artifact

use std::fmt::Write as _;

use solfetch_compile::{
    compile, CompileError, CompiledArtifact, CompilerSettings, ContractSelection, LinkReferences,
    SolcProcess,
};
use solfetch_config::{SolfetchConfig, DEFAULT_SOLC, KNOWN_EVM_VERSIONS};
use solfetch_diagnostics::DiagnosticSink;

use crate::pipeline::{load_project_config, plan, render_diagnostics, resolve_graph};
use crate::{BuildArgs, GlobalArgs, ReportFormat};

/// Runs the `solfetch build` command.
///
/// Returns exit code 0 when an artifact was produced, 1 when the compiler
/// reported errors.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_project_config(global)?;
    let plan = plan(&args.resolve, config.as_ref())?;
    let settings = compiler_settings(args, config.as_ref())?;
    let selection = ContractSelection::from_name(
        args.contract
            .clone()
            .or_else(|| config.as_ref().and_then(|c| c.compiler.contract.clone())),
    );
    let solc = SolcProcess::new(
        args.solc
            .clone()
            .or_else(|| config.as_ref().map(|c| c.compiler.solc.clone()))
            .unwrap_or_else(|| DEFAULT_SOLC.to_string()),
    );

    let graph = resolve_graph(&plan)?;

    if !global.quiet {
        eprintln!(
            "   Compiling {} ({} files, evm {})",
            plan.entry,
            graph.len(),
            settings.evm_version
        );
    }

    let sink = DiagnosticSink::new();
    let result = compile(&graph, &solc, &settings, &selection, &sink);
    render_diagnostics(&sink, &graph, args.format, global.color);

    match result {
        Ok(artifact) => {
            match args.format {
                ReportFormat::Text => print!("{}", format_artifact(&artifact)),
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&artifact)?),
            }
            if !global.quiet && args.format == ReportFormat::Text {
                eprintln!(
                    "   Result: {} error(s), {} warning(s)",
                    sink.error_count(),
                    sink.warning_count()
                );
            }
            Ok(0)
        }
        Err(CompileError::Diagnostics { entry, error_count }) => {
            if !global.quiet {
                eprintln!("   Result: {error_count} error(s) compiling {entry}");
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

/// Merges `--evm-version`, `--runs` and `--no-optimize` over the config.
fn compiler_settings(
    args: &BuildArgs,
    config: Option<&SolfetchConfig>,
) -> Result<CompilerSettings, Box<dyn std::error::Error>> {
    let mut settings = match config {
        Some(c) => CompilerSettings {
            evm_version: c.compiler.evm_version.clone(),
            optimizer_enabled: c.compiler.optimizer.enabled,
            optimizer_runs: c.compiler.optimizer.runs,
        },
        None => CompilerSettings::default(),
    };

    if let Some(ref version) = args.evm_version {
        if !KNOWN_EVM_VERSIONS.contains(&version.as_str()) {
            return Err(format!("unknown evm version '{version}'").into());
        }
        settings.evm_version = version.clone();
    }
    if let Some(runs) = args.runs {
        settings.optimizer_runs = runs;
    }
    if args.no_optimize {
        settings.optimizer_enabled = false;
    }
    Ok(settings)
}

/// Formats an artifact for the terminal.
fn format_artifact(artifact: &CompiledArtifact) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "contract:          {}", artifact.contract_name);
    let _ = writeln!(out, "source:            {}", artifact.source_name);
    let _ = writeln!(
        out,
        "creation bytecode: 0x{} ({} bytes)",
        artifact.creation_bytecode,
        artifact.creation_bytecode.len() / 2
    );
    write_links(&mut out, &artifact.creation_bytecode_link_refs);
    let _ = writeln!(
        out,
        "deployed bytecode: 0x{} ({} bytes)",
        artifact.deployed_bytecode,
        artifact.deployed_bytecode.len() / 2
    );
    write_links(&mut out, &artifact.deployed_bytecode_link_refs);
    let _ = writeln!(out, "metadata:          {}", artifact.metadata);
    out
}

fn write_links(out: &mut String, links: &LinkReferences) {
    for (file, libraries) in links {
        for (library, offsets) in libraries {
            let _ = writeln!(
                out,
                "  links {library} ({file}) at {} offset(s)",
                offsets.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolveArgs;
    use std::collections::BTreeMap;

    fn build_args() -> BuildArgs {
        BuildArgs {
            resolve: ResolveArgs {
                entry: Some("https://host/A.sol".to_string()),
                params: None,
                jobs: None,
                allow_cycles: false,
            },
            contract: None,
            format: ReportFormat::Text,
            evm_version: None,
            runs: None,
            no_optimize: false,
            solc: None,
        }
    }

    #[test]
    fn settings_default_without_config() {
        let settings = compiler_settings(&build_args(), None).unwrap();
        assert_eq!(settings, CompilerSettings::default());
    }

    #[test]
    fn settings_from_config_and_flags() {
        let config = solfetch_config::load_config_from_str(
            r#"
[source]
entry = "https://host/A.sol"

[compiler]
evm_version = "london"

[compiler.optimizer]
runs = 200
"#,
        )
        .unwrap();

        let settings = compiler_settings(&build_args(), Some(&config)).unwrap();
        assert_eq!(settings.evm_version, "london");
        assert_eq!(settings.optimizer_runs, 200);
        assert!(settings.optimizer_enabled);

        let args = BuildArgs {
            evm_version: Some("shanghai".to_string()),
            runs: Some(1),
            no_optimize: true,
            ..build_args()
        };
        let settings = compiler_settings(&args, Some(&config)).unwrap();
        assert_eq!(settings.evm_version, "shanghai");
        assert_eq!(settings.optimizer_runs, 1);
        assert!(!settings.optimizer_enabled);
    }

    #[test]
    fn unknown_evm_version_flag_rejected() {
        let args = BuildArgs {
            evm_version: Some("frontier-2".to_string()),
            ..build_args()
        };
        assert!(compiler_settings(&args, None).is_err());
    }

    #[test]
    fn artifact_text_layout() {
        let mut links = LinkReferences::new();
        links.insert(
            "https://host/lib/Math.sol".to_string(),
            BTreeMap::from([(
                "Math".to_string(),
                vec![solfetch_compile::output::LinkOffset {
                    start: 1,
                    length: 20,
                }],
            )]),
        );
        let artifact = CompiledArtifact {
            contract_name: "A".to_string(),
            source_name: "https://host/A.sol".to_string(),
            creation_bytecode: "6080".to_string(),
            creation_bytecode_link_refs: links,
            deployed_bytecode: "60".to_string(),
            deployed_bytecode_link_refs: LinkReferences::new(),
            metadata: "{}".to_string(),
        };
        let text = format_artifact(&artifact);
        assert!(text.contains("contract:          A\n"));
        assert!(text.contains("creation bytecode: 0x6080 (2 bytes)\n"));
        assert!(text.contains("  links Math (https://host/lib/Math.sol) at 1 offset(s)\n"));
        assert!(text.contains("deployed bytecode: 0x60 (1 bytes)\n"));
        assert!(text.ends_with("metadata:          {}\n"));
    }
}
