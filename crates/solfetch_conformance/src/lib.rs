//! Conformance test helpers for solfetch.
//!
//! Provides a [`ScriptedCompiler`] that behaves like `solc` as far as the
//! import callback is concerned (it walks import statements and asks the
//! resolver for every file it has not been given) without needing a real
//! compiler binary, plus shortcuts that run the resolve and build phases
//! and return structured results for assertion in integration tests.

#![warn(missing_docs)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use solfetch_common::ContentHash;
use solfetch_compile::output::{EvmOutput, OutputError, SourceLocation};
use solfetch_compile::{
    Bytecode, CompileError, CompiledArtifact, Compiler, CompilerInput, CompilerOutput,
    CompilerSettings, ContractOutput, ContractSelection, ImportResolver, ImportResponse,
};
use solfetch_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use solfetch_fetch::{Fetcher, MemoryFetcher};
use solfetch_resolve::{extract_imports, ResolveError, ResolveOptions, Resolver};
use solfetch_source::{ResolvedGraph, RetrievalKey};

static CONTRACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:abstract\s+)?(?:contract|library|interface)\s+([A-Za-z_$][\w$]*)")
        .expect("contract pattern is valid")
});

/// Marker that makes the scripted compiler report a parser error.
pub const SYNTAX_ERROR_MARKER: &str = "@@syntax-error@@";

/// A stand-in compiler driven entirely by the import callback.
///
/// Starting from the sources in the input it harvests import statements,
/// turns each into the source unit name the real compiler would request
/// (relative paths joined onto the importer's directory, everything else
/// verbatim) and asks the resolver for it. Every contract, library and
/// interface declared in an input source is emitted with a bytecode derived
/// from its name.
#[derive(Default)]
pub struct ScriptedCompiler {
    requested: RefCell<Vec<String>>,
}

impl ScriptedCompiler {
    /// Creates a compiler with an empty request log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every path requested through the import callback, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Compiler for ScriptedCompiler {
    fn compile(
        &self,
        input: &CompilerInput,
        imports: &dyn ImportResolver,
    ) -> Result<CompilerOutput, CompileError> {
        let mut sources: BTreeMap<String, String> = input
            .sources
            .iter()
            .map(|(name, entry)| (name.clone(), entry.content.clone()))
            .collect();
        let mut output = CompilerOutput::default();

        let mut queue: Vec<String> = sources.keys().cloned().collect();
        while let Some(name) = queue.pop() {
            let text = sources.get(&name).cloned().unwrap_or_default();
            for specifier in extract_imports(&text) {
                let wanted = unit_name(&name, &specifier);
                if sources.contains_key(&wanted) {
                    continue;
                }
                self.requested.borrow_mut().push(wanted.clone());
                match imports.resolve_import(&wanted) {
                    ImportResponse::Contents(contents) => {
                        sources.insert(wanted.clone(), contents);
                        queue.push(wanted);
                    }
                    ImportResponse::Error(reason) => output.errors.push(OutputError {
                        severity: Severity::Error,
                        kind: "ParserError".to_string(),
                        error_code: Some("6275".to_string()),
                        message: format!("Source \"{wanted}\" not found: {reason}"),
                        formatted_message: None,
                        source_location: None,
                    }),
                }
            }
        }

        for (name, text) in &sources {
            if let Some(offset) = text.find(SYNTAX_ERROR_MARKER) {
                output.errors.push(OutputError {
                    severity: Severity::Error,
                    kind: "ParserError".to_string(),
                    error_code: Some("2314".to_string()),
                    message: "Expected ';' but got identifier".to_string(),
                    formatted_message: None,
                    source_location: Some(SourceLocation {
                        file: name.clone(),
                        start: offset as i64,
                        end: (offset + SYNTAX_ERROR_MARKER.len()) as i64,
                    }),
                });
            }

            let contracts: BTreeMap<String, ContractOutput> = CONTRACT
                .captures_iter(text)
                .map(|caps| {
                    let contract = caps[1].to_string();
                    let code = ContentHash::from_text(&format!("{name}:{contract}")).to_string();
                    let metadata = serde_json::json!({
                        "contract": contract,
                        "sources": sources.keys().collect::<Vec<_>>(),
                    })
                    .to_string();
                    let compiled = ContractOutput {
                        metadata,
                        evm: EvmOutput {
                            bytecode: Bytecode {
                                object: code.clone(),
                                link_references: BTreeMap::new(),
                            },
                            deployed_bytecode: Bytecode {
                                object: code[..16].to_string(),
                                link_references: BTreeMap::new(),
                            },
                        },
                    };
                    (contract, compiled)
                })
                .collect();
            if !contracts.is_empty() {
                output.contracts.insert(name.clone(), contracts);
            }
        }

        if output.has_errors() {
            output.contracts.clear();
        }
        Ok(output)
    }
}

/// Returns the source unit name a compiler requests for `specifier` when
/// it appears in the unit named `importer`.
pub fn unit_name(importer: &str, specifier: &str) -> String {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return specifier.to_string();
    }
    let mut segments: Vec<&str> = importer.split('/').collect();
    segments.pop();
    for part in specifier.split('/') {
        match part {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Parses a location, panicking on malformed test input.
pub fn key(location: &str) -> RetrievalKey {
    RetrievalKey::parse(location).expect("test location is a valid URL")
}

/// A three-file tree: `A.sol` imports `./lib/B.sol`, which imports `./C.sol`.
///
/// `A.sol` uses the `$(FOO)` placeholder.
pub fn three_file_fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_file(
            "https://host/A.sol",
            r#"pragma solidity ^0.8.0;

import {B} from "./lib/B.sol";

contract A is B {
    uint256 public constant FOO = $(FOO);
}
"#,
        )
        .with_file(
            "https://host/lib/B.sol",
            r#"pragma solidity ^0.8.0;

import {C} from "./C.sol";

contract B is C {}
"#,
        )
        .with_file(
            "https://host/lib/C.sol",
            "pragma solidity ^0.8.0;\n\ncontract C {}\n",
        )
        .with_file("https://host/params.json", r#"{"FOO": 42}"#)
}

/// Resolves `root` on a fresh single-threaded runtime.
pub fn resolve_blocking(
    fetcher: &dyn Fetcher,
    root: &str,
    parameter_text: Option<&str>,
    options: ResolveOptions,
) -> Result<ResolvedGraph, ResolveError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime builds");
    runtime.block_on(solfetch_resolve::resolve(
        fetcher,
        &key(root),
        parameter_text,
        options,
    ))
}

/// Resolves `root` with the parameter document fetched from `params`.
pub fn resolve_with_parameters_blocking(
    fetcher: &dyn Fetcher,
    root: &str,
    params: &str,
) -> Result<ResolvedGraph, ResolveError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime builds");
    runtime.block_on(async {
        Resolver::new(fetcher, ResolveOptions::default())
            .load_parameters(&key(params))
            .await?
            .resolve(&key(root))
            .await
    })
}

/// Result of compiling a resolved graph with the [`ScriptedCompiler`].
pub struct BuildResult {
    /// The artifact, or why there is none.
    pub artifact: Result<CompiledArtifact, CompileError>,
    /// Every diagnostic emitted during compilation.
    pub diagnostics: Vec<Diagnostic>,
    /// Paths the compiler requested through the import bridge.
    pub requested: Vec<String>,
}

/// Compiles `graph` with the [`ScriptedCompiler`] and default settings.
pub fn build(graph: &ResolvedGraph, selection: ContractSelection) -> BuildResult {
    let compiler = ScriptedCompiler::new();
    let sink = DiagnosticSink::new();
    let artifact = solfetch_compile::compile(
        graph,
        &compiler,
        &CompilerSettings::default(),
        &selection,
        &sink,
    );
    BuildResult {
        artifact,
        diagnostics: sink.take_all(),
        requested: compiler.requested(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_names_follow_compiler_rules() {
        assert_eq!(
            unit_name("https://host/A.sol", "./lib/B.sol"),
            "https://host/lib/B.sol"
        );
        assert_eq!(
            unit_name("https://host/lib/B.sol", "./C.sol"),
            "https://host/lib/C.sol"
        );
        assert_eq!(
            unit_name("https://host/a/b/X.sol", "../c/Y.sol"),
            "https://host/a/c/Y.sol"
        );
        assert_eq!(unit_name("https://host/A.sol", "lib/Math.sol"), "lib/Math.sol");
    }
}
