//! The compiler's standard-JSON input document.

use serde::{Deserialize, Serialize};
use solfetch_source::ResolvedGraph;
use std::collections::BTreeMap;

/// Output fields requested for every contract.
pub const OUTPUT_SELECTION: &[&str] = &["metadata", "evm.bytecode", "evm.deployedBytecode"];

/// Build settings taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Target EVM version, e.g. `paris`.
    pub evm_version: String,
    /// Whether the optimizer runs.
    pub optimizer_enabled: bool,
    /// Optimizer runs parameter.
    pub optimizer_runs: u32,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            evm_version: "paris".to_string(),
            optimizer_enabled: true,
            optimizer_runs: 9_999_999,
        }
    }
}

/// A standard-JSON compiler input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerInput {
    /// Always `Solidity`.
    pub language: String,
    /// Source unit name to text.
    pub sources: BTreeMap<String, SourceEntry>,
    /// Compiler settings.
    pub settings: Settings,
}

/// One entry of [`CompilerInput::sources`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// The source text.
    pub content: String,
}

/// The `settings` object of a [`CompilerInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Optimizer configuration.
    pub optimizer: Optimizer,
    /// Target EVM version.
    pub evm_version: String,
    /// File → contract → requested outputs.
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// The `settings.optimizer` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    /// Whether the optimizer runs.
    pub enabled: bool,
    /// Optimizer runs parameter.
    pub runs: u32,
}

impl CompilerInput {
    /// Builds an input whose only initial source is the graph's entry unit.
    ///
    /// Everything else reaches the compiler through the import bridge.
    pub fn for_entry(graph: &ResolvedGraph, settings: &CompilerSettings) -> Self {
        let entry = graph.entry();
        let mut sources = BTreeMap::new();
        sources.insert(
            entry.key.to_string(),
            SourceEntry {
                content: entry.content.clone(),
            },
        );

        let outputs = OUTPUT_SELECTION.iter().map(|s| s.to_string()).collect();
        let output_selection =
            BTreeMap::from([("*".to_string(), BTreeMap::from([("*".to_string(), outputs)]))]);

        Self {
            language: "Solidity".to_string(),
            sources,
            settings: Settings {
                optimizer: Optimizer {
                    enabled: settings.optimizer_enabled,
                    runs: settings.optimizer_runs,
                },
                evm_version: settings.evm_version.clone(),
                output_selection,
            },
        }
    }

    /// Adds `content` under `name`. Returns `false` if `name` was already present.
    pub fn add_source(&mut self, name: impl Into<String>, content: impl Into<String>) -> bool {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return false;
        }
        self.sources.insert(
            name,
            SourceEntry {
                content: content.into(),
            },
        );
        true
    }

    /// Returns `true` if a source named `name` is present.
    pub fn has_source(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Serializes the input to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solfetch_source::{RetrievalKey, SourceCache};

    fn graph() -> ResolvedGraph {
        let mut cache = SourceCache::new();
        cache
            .add_source("https://host/A.sol", "contract A {}")
            .unwrap();
        cache
            .add_source("https://host/lib/B.sol", "contract B {}")
            .unwrap();
        ResolvedGraph::new(cache, &RetrievalKey::parse("https://host/A.sol").unwrap()).unwrap()
    }

    #[test]
    fn entry_is_the_only_initial_source() {
        let input = CompilerInput::for_entry(&graph(), &CompilerSettings::default());
        assert_eq!(input.sources.len(), 1);
        assert_eq!(input.sources["https://host/A.sol"].content, "contract A {}");
    }

    #[test]
    fn json_shape() {
        let input = CompilerInput::for_entry(&graph(), &CompilerSettings::default());
        let value: serde_json::Value = serde_json::from_str(&input.to_json().unwrap()).unwrap();
        assert_eq!(value["language"], "Solidity");
        assert_eq!(value["settings"]["evmVersion"], "paris");
        assert_eq!(value["settings"]["optimizer"]["enabled"], true);
        assert_eq!(value["settings"]["optimizer"]["runs"], 9_999_999);
        assert_eq!(
            value["settings"]["outputSelection"]["*"]["*"],
            serde_json::json!(["metadata", "evm.bytecode", "evm.deployedBytecode"])
        );
        assert_eq!(
            value["sources"]["https://host/A.sol"]["content"],
            "contract A {}"
        );
    }

    #[test]
    fn settings_are_applied() {
        let settings = CompilerSettings {
            evm_version: "shanghai".to_string(),
            optimizer_enabled: false,
            optimizer_runs: 200,
        };
        let input = CompilerInput::for_entry(&graph(), &settings);
        assert_eq!(input.settings.evm_version, "shanghai");
        assert_eq!(
            input.settings.optimizer,
            Optimizer {
                enabled: false,
                runs: 200
            }
        );
    }

    #[test]
    fn add_source_keeps_first() {
        let mut input = CompilerInput::for_entry(&graph(), &CompilerSettings::default());
        assert!(input.add_source("https://host/lib/B.sol", "contract B {}"));
        assert!(!input.add_source("https://host/lib/B.sol", "changed"));
        assert!(input.has_source("https://host/lib/B.sol"));
        assert_eq!(input.sources["https://host/lib/B.sol"].content, "contract B {}");
    }
}
