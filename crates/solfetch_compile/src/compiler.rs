//! The compiler seam and the `solc` process implementation.

use crate::bridge::{ImportResolver, ImportResponse};
use crate::error::CompileError;
use crate::input::CompilerInput;
use crate::output::CompilerOutput;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Upper bound on compile rounds spent pulling in missing imports.
pub const DEFAULT_MAX_ROUNDS: usize = 64;

static MISSING_SOURCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Source "([^"]+)" not found"#).expect("missing-source pattern is valid"));

/// A compiler that accepts standard-JSON input and a synchronous import callback.
pub trait Compiler {
    /// Compiles `input`, asking `imports` for any source it does not contain.
    fn compile(
        &self,
        input: &CompilerInput,
        imports: &dyn ImportResolver,
    ) -> Result<CompilerOutput, CompileError>;
}

/// Runs an external `solc --standard-json` binary.
///
/// A child process cannot call back into us, so the import callback is
/// emulated: after each run the `Source "X" not found` errors are collected,
/// each missing path is requested from the resolver, and the compiler runs
/// again with the new sources until nothing new can be supplied.
#[derive(Debug, Clone)]
pub struct SolcProcess {
    binary: PathBuf,
    max_rounds: usize,
}

impl SolcProcess {
    /// Uses the compiler at `binary` (a path or a name looked up on `PATH`).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Limits how many times the compiler is re-run for missing imports.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    /// Returns the compiler binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, input: &CompilerInput) -> Result<CompilerOutput, CompileError> {
        let json = input
            .to_json()
            .map_err(|e| CompileError::Compiler(format!("failed to encode compiler input: {e}")))?;

        let mut child = Command::new(&self.binary)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompileError::Compiler(format!("failed to start {}: {e}", self.binary.display()))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(json.as_bytes()).map_err(|e| {
                CompileError::Compiler(format!("failed to write to {}: {e}", self.binary.display()))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            CompileError::Compiler(format!("failed to wait for {}: {e}", self.binary.display()))
        })?;

        if !output.status.success() && output.stdout.is_empty() {
            return Err(CompileError::Compiler(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        CompilerOutput::from_json(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| CompileError::InvalidOutput(e.to_string()))
    }
}

impl Compiler for SolcProcess {
    fn compile(
        &self,
        input: &CompilerInput,
        imports: &dyn ImportResolver,
    ) -> Result<CompilerOutput, CompileError> {
        let mut input = input.clone();
        let mut refused: BTreeMap<String, String> = BTreeMap::new();

        for round in 1..=self.max_rounds {
            let mut output = self.run(&input)?;

            let mut added = 0;
            for path in missing_sources(&output) {
                if input.has_source(&path) || refused.contains_key(&path) {
                    continue;
                }
                match imports.resolve_import(&path) {
                    ImportResponse::Contents(text) => {
                        input.add_source(path, text);
                        added += 1;
                    }
                    ImportResponse::Error(reason) => {
                        refused.insert(path, reason);
                    }
                }
            }

            if added == 0 {
                info!(rounds = round, sources = input.sources.len(), "compilation finished");
                explain_refusals(&mut output, &refused);
                return Ok(output);
            }
            debug!(round, added, "re-running compiler with imported sources");
        }

        Err(CompileError::Compiler(format!(
            "imports still unresolved after {} compiler runs",
            self.max_rounds
        )))
    }
}

/// Returns the paths the compiler reported as missing, in report order.
pub fn missing_sources(output: &CompilerOutput) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for error in &output.errors {
        for caps in MISSING_SOURCE.captures_iter(&error.message) {
            let path = caps[1].to_string();
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Rewrites "not found" errors to carry the reason the resolver gave, the
/// way the compiler reports a failed import callback.
fn explain_refusals(output: &mut CompilerOutput, refused: &BTreeMap<String, String>) {
    for error in &mut output.errors {
        let Some(path) = MISSING_SOURCE
            .captures(&error.message)
            .map(|caps| caps[1].to_string())
        else {
            continue;
        };
        if let Some(reason) = refused.get(&path) {
            error.message = format!("Source \"{path}\" not found: {reason}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::NOT_FOUND;
    use crate::output::OutputError;
    use solfetch_diagnostics::Severity;

    fn not_found(path: &str) -> OutputError {
        OutputError {
            severity: Severity::Error,
            kind: "ParserError".to_string(),
            error_code: Some("6275".to_string()),
            message: format!("Source \"{path}\" not found: File not supplied initially."),
            formatted_message: None,
            source_location: None,
        }
    }

    #[test]
    fn missing_sources_are_deduplicated() {
        let output = CompilerOutput {
            errors: vec![
                not_found("https://host/lib/B.sol"),
                not_found("https://host/lib/C.sol"),
                not_found("https://host/lib/B.sol"),
            ],
            ..CompilerOutput::default()
        };
        assert_eq!(
            missing_sources(&output),
            vec!["https://host/lib/B.sol", "https://host/lib/C.sol"]
        );
    }

    #[test]
    fn refusals_carry_the_resolver_reason() {
        let mut output = CompilerOutput {
            errors: vec![not_found("https://host/Nope.sol")],
            ..CompilerOutput::default()
        };
        let refused = BTreeMap::from([(
            "https://host/Nope.sol".to_string(),
            NOT_FOUND.to_string(),
        )]);
        explain_refusals(&mut output, &refused);
        assert_eq!(
            output.errors[0].message,
            "Source \"https://host/Nope.sol\" not found: File not found"
        );
    }

    #[test]
    fn missing_binary_is_a_compiler_error() {
        struct NoImports;
        impl ImportResolver for NoImports {
            fn resolve_import(&self, _path: &str) -> ImportResponse {
                ImportResponse::Error(NOT_FOUND.to_string())
            }
        }

        let solc = SolcProcess::new("/nonexistent/solfetch-test/solc");
        let input: CompilerInput = serde_json::from_value(serde_json::json!({
            "language": "Solidity",
            "sources": {"https://host/A.sol": {"content": "contract A {}"}},
            "settings": {
                "optimizer": {"enabled": true, "runs": 200},
                "evmVersion": "paris",
                "outputSelection": {}
            }
        }))
        .unwrap();
        let err = solc.compile(&input, &NoImports).unwrap_err();
        assert!(matches!(err, CompileError::Compiler(_)));
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use std::cell::RefCell;
        use std::os::unix::fs::PermissionsExt;

        struct Recording {
            served: RefCell<Vec<String>>,
        }

        impl ImportResolver for Recording {
            fn resolve_import(&self, path: &str) -> ImportResponse {
                self.served.borrow_mut().push(path.to_string());
                ImportResponse::Contents("contract B {}".to_string())
            }
        }

        /// A stand-in compiler that reports `lib/B.sol` missing until the
        /// input contains it.
        const SCRIPT: &str = r#"#!/bin/sh
input=$(cat)
case "$input" in
  *'"https://host/lib/B.sol"'*)
    printf '%s\n' '{"contracts":{"https://host/A.sol":{"A":{"metadata":"{}","evm":{"bytecode":{"object":"60","linkReferences":{}},"deployedBytecode":{"object":"61","linkReferences":{}}}}}}}'
    ;;
  *)
    printf '%s\n' '{"errors":[{"severity":"error","type":"ParserError","errorCode":"6275","message":"Source \"https://host/lib/B.sol\" not found: File not supplied initially."}]}'
    ;;
esac
"#;

        #[test]
        fn missing_imports_are_fed_back() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("solc");
            std::fs::write(&path, SCRIPT).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

            let input: CompilerInput = serde_json::from_value(serde_json::json!({
                "language": "Solidity",
                "sources": {"https://host/A.sol": {"content": "import \"./lib/B.sol\";"}},
                "settings": {
                    "optimizer": {"enabled": true, "runs": 200},
                    "evmVersion": "paris",
                    "outputSelection": {}
                }
            }))
            .unwrap();
            let resolver = Recording {
                served: RefCell::new(Vec::new()),
            };

            let output = SolcProcess::new(&path).compile(&input, &resolver).unwrap();
            assert!(output.errors.is_empty());
            assert_eq!(
                output.contracts["https://host/A.sol"]["A"].evm.bytecode.object,
                "60"
            );
            assert_eq!(*resolver.served.borrow(), vec!["https://host/lib/B.sol"]);
        }
    }
}
