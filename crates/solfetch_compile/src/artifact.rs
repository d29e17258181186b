//! Selecting a contract from compiler output and extracting its artifact.

use crate::bridge::ImportBridge;
use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::input::{CompilerInput, CompilerSettings};
use crate::output::{CompilerOutput, ContractOutput, LinkReferences};
use crate::report::report_errors;
use serde::{Deserialize, Serialize};
use solfetch_diagnostics::DiagnosticSink;
use solfetch_source::ResolvedGraph;
use tracing::{debug, warn};

/// Which contract of the entry source becomes the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContractSelection {
    /// The first contract in name order.
    #[default]
    First,
    /// The contract with this exact name.
    Named(String),
}

impl ContractSelection {
    /// `Named` when a name is given, `First` otherwise.
    pub fn from_name(name: Option<String>) -> Self {
        name.map_or(ContractSelection::First, ContractSelection::Named)
    }
}

/// Bytecode, link references and metadata for one compiled contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    /// The selected contract.
    pub contract_name: String,
    /// The source unit that defines it.
    pub source_name: String,
    /// Hex creation bytecode.
    pub creation_bytecode: String,
    /// Unlinked libraries in the creation bytecode.
    pub creation_bytecode_link_refs: LinkReferences,
    /// Hex runtime bytecode.
    pub deployed_bytecode: String,
    /// Unlinked libraries in the runtime bytecode.
    pub deployed_bytecode_link_refs: LinkReferences,
    /// Contract metadata as a JSON string.
    pub metadata: String,
}

impl CompiledArtifact {
    fn from_output(source: &str, name: &str, contract: &ContractOutput) -> Self {
        Self {
            contract_name: name.to_string(),
            source_name: source.to_string(),
            creation_bytecode: contract.evm.bytecode.object.clone(),
            creation_bytecode_link_refs: contract.evm.bytecode.link_references.clone(),
            deployed_bytecode: contract.evm.deployed_bytecode.object.clone(),
            deployed_bytecode_link_refs: contract.evm.deployed_bytecode.link_references.clone(),
            metadata: contract.metadata.clone(),
        }
    }
}

/// Picks the contract named by `selection` from the contracts of `entry`.
pub fn select_contract<'o>(
    output: &'o CompilerOutput,
    entry: &str,
    selection: &ContractSelection,
) -> Result<(&'o str, &'o ContractOutput), CompileError> {
    let contracts = output
        .contracts_in(entry)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CompileError::EmptyCompilation {
            entry: entry.to_string(),
        })?;

    match selection {
        ContractSelection::Named(name) => contracts
            .get_key_value(name.as_str())
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| CompileError::ContractNotFound {
                contract: name.clone(),
                entry: entry.to_string(),
                available: contracts.keys().cloned().collect(),
            }),
        ContractSelection::First => {
            if contracts.len() > 1 {
                let names: Vec<&str> = contracts.keys().map(String::as_str).collect();
                warn!(
                    entry,
                    candidates = ?names,
                    "several contracts defined, picking the first by name"
                );
            }
            contracts
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| CompileError::EmptyCompilation {
                    entry: entry.to_string(),
                })
        }
    }
}

/// Compiles the graph's entry unit and extracts the selected contract.
///
/// Import requests are answered from `graph` only. Compiler diagnostics are
/// emitted into `sink`; any error-severity diagnostic fails the build.
pub fn compile(
    graph: &ResolvedGraph,
    compiler: &dyn Compiler,
    settings: &CompilerSettings,
    selection: &ContractSelection,
    sink: &DiagnosticSink,
) -> Result<CompiledArtifact, CompileError> {
    let entry = graph.entry().key.to_string();
    let input = CompilerInput::for_entry(graph, settings);
    let bridge = ImportBridge::new(graph);

    let output = compiler.compile(&input, &bridge)?;
    let misses = bridge.misses();
    if !misses.is_empty() {
        debug!(?misses, "compiler requested files outside the resolved graph");
    }

    report_errors(&output, graph, sink);
    if output.has_errors() {
        return Err(CompileError::Diagnostics {
            entry,
            error_count: output.error_count(),
        });
    }

    let (name, contract) = select_contract(&output, &entry, selection)?;
    Ok(CompiledArtifact::from_output(&entry, name, contract))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Bytecode, EvmOutput};
    use std::collections::BTreeMap;

    fn contract(code: &str) -> ContractOutput {
        ContractOutput {
            metadata: format!("{{\"name\":\"{code}\"}}"),
            evm: EvmOutput {
                bytecode: Bytecode {
                    object: code.to_string(),
                    link_references: BTreeMap::new(),
                },
                deployed_bytecode: Bytecode {
                    object: format!("{code}ff"),
                    link_references: BTreeMap::new(),
                },
            },
        }
    }

    fn output(names: &[&str]) -> CompilerOutput {
        let contracts = names
            .iter()
            .map(|n| (n.to_string(), contract(&n.to_lowercase())))
            .collect();
        CompilerOutput {
            errors: Vec::new(),
            contracts: BTreeMap::from([("https://host/A.sol".to_string(), contracts)]),
        }
    }

    #[test]
    fn first_is_lexicographic() {
        let out = output(&["Zeta", "Alpha"]);
        let (name, c) =
            select_contract(&out, "https://host/A.sol", &ContractSelection::First).unwrap();
        assert_eq!(name, "Alpha");
        assert_eq!(c.evm.bytecode.object, "alpha");
    }

    #[test]
    fn named_selection() {
        let out = output(&["Zeta", "Alpha"]);
        let selection = ContractSelection::from_name(Some("Zeta".to_string()));
        let (name, _) = select_contract(&out, "https://host/A.sol", &selection).unwrap();
        assert_eq!(name, "Zeta");
    }

    #[test]
    fn named_selection_must_exist() {
        let out = output(&["Alpha"]);
        let selection = ContractSelection::Named("Beta".to_string());
        let err = select_contract(&out, "https://host/A.sol", &selection).unwrap_err();
        match err {
            CompileError::ContractNotFound {
                contract,
                available,
                ..
            } => {
                assert_eq!(contract, "Beta");
                assert_eq!(available, vec!["Alpha"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_contracts_is_empty_compilation() {
        let out = output(&[]);
        let err = select_contract(&out, "https://host/A.sol", &ContractSelection::First).unwrap_err();
        assert!(matches!(err, CompileError::EmptyCompilation { .. }));

        let missing = CompilerOutput::default();
        let err =
            select_contract(&missing, "https://host/A.sol", &ContractSelection::First).unwrap_err();
        assert!(matches!(err, CompileError::EmptyCompilation { .. }));
    }

    #[test]
    fn artifact_fields() {
        let out = output(&["Alpha"]);
        let (name, c) =
            select_contract(&out, "https://host/A.sol", &ContractSelection::First).unwrap();
        let artifact = CompiledArtifact::from_output("https://host/A.sol", name, c);
        assert_eq!(artifact.contract_name, "Alpha");
        assert_eq!(artifact.creation_bytecode, "alpha");
        assert_eq!(artifact.deployed_bytecode, "alphaff");
        assert_eq!(artifact.metadata, "{\"name\":\"alpha\"}");

        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["creationBytecode"], "alpha");
        assert!(json["deployedBytecodeLinkRefs"].is_object());
    }

    #[test]
    fn selection_from_missing_name_is_first() {
        assert_eq!(ContractSelection::from_name(None), ContractSelection::First);
    }
}
