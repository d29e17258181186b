//! The compiler's standard-JSON output document.
//!
//! Only the fields solfetch reads are modelled; everything else in the
//! compiler's output is ignored during deserialization.

use serde::{Deserialize, Serialize};
use solfetch_diagnostics::Severity;
use std::collections::BTreeMap;

/// Source file → library name → placeholder offsets.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// A parsed standard-JSON compiler output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// Errors, warnings and infos, in the order the compiler reported them.
    #[serde(default)]
    pub errors: Vec<OutputError>,
    /// Source name → contract name → outputs. Ordered, so iteration is stable.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputError {
    /// `error`, `warning` or `info`.
    pub severity: Severity,
    /// Error class such as `ParserError` or `TypeError`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Numeric error code as a string.
    #[serde(default)]
    pub error_code: Option<String>,
    /// Short message.
    pub message: String,
    /// Message with source context, as the compiler would print it.
    #[serde(default)]
    pub formatted_message: Option<String>,
    /// Primary location.
    #[serde(default)]
    pub source_location: Option<SourceLocation>,
}

/// A byte range in one of the compiled sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source unit name.
    pub file: String,
    /// Start byte offset, `-1` if unknown.
    pub start: i64,
    /// End byte offset, `-1` if unknown.
    pub end: i64,
}

/// Outputs for one contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractOutput {
    /// Contract metadata as a JSON string.
    #[serde(default)]
    pub metadata: String,
    /// EVM outputs.
    #[serde(default)]
    pub evm: EvmOutput,
}

/// The `evm` object of a [`ContractOutput`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmOutput {
    /// Creation bytecode.
    #[serde(default)]
    pub bytecode: Bytecode,
    /// Runtime bytecode.
    #[serde(default)]
    pub deployed_bytecode: Bytecode,
}

/// Hex bytecode plus the library placeholders it still contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    /// Hex-encoded bytecode without a `0x` prefix.
    #[serde(default)]
    pub object: String,
    /// Unlinked library references.
    #[serde(default)]
    pub link_references: LinkReferences,
}

/// Position of one library placeholder in a bytecode object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOffset {
    /// Byte offset of the placeholder.
    pub start: u32,
    /// Placeholder length in bytes.
    pub length: u32,
}

impl CompilerOutput {
    /// Parses a standard-JSON output document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns `true` if any reported diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity.is_error())
    }

    /// Returns the number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.severity.is_error()).count()
    }

    /// Returns the contracts defined in `source`, if the compiler emitted any.
    pub fn contracts_in(&self, source: &str) -> Option<&BTreeMap<String, ContractOutput>> {
        self.contracts.get(source)
    }
}

impl Bytecode {
    /// Returns `true` if the bytecode still needs libraries linked in.
    pub fn needs_linking(&self) -> bool {
        self.link_references.values().any(|libs| !libs.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "errors": [
            {
                "component": "general",
                "errorCode": "2072",
                "formattedMessage": "Warning: Unused local variable.",
                "message": "Unused local variable.",
                "severity": "warning",
                "sourceLocation": {"end": 120, "file": "https://host/A.sol", "start": 110},
                "type": "Warning"
            }
        ],
        "sources": {"https://host/A.sol": {"id": 0}},
        "contracts": {
            "https://host/A.sol": {
                "A": {
                    "abi": [],
                    "metadata": "{\"compiler\":{\"version\":\"0.8.24\"}}",
                    "evm": {
                        "bytecode": {
                            "object": "6080",
                            "linkReferences": {
                                "https://host/lib/Math.sol": {
                                    "Math": [{"start": 10, "length": 20}]
                                }
                            }
                        },
                        "deployedBytecode": {"object": "6081", "linkReferences": {}}
                    }
                }
            }
        }
    }"#;

    #[test]
    fn parses_relevant_fields() {
        let out = CompilerOutput::from_json(SAMPLE).unwrap();
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].severity, Severity::Warning);
        assert_eq!(out.errors[0].kind, "Warning");
        assert_eq!(out.errors[0].error_code.as_deref(), Some("2072"));
        assert!(!out.has_errors());

        let a = &out.contracts_in("https://host/A.sol").unwrap()["A"];
        assert_eq!(a.evm.bytecode.object, "6080");
        assert_eq!(a.evm.deployed_bytecode.object, "6081");
        assert!(a.evm.bytecode.needs_linking());
        assert!(!a.evm.deployed_bytecode.needs_linking());
        assert_eq!(
            a.evm.bytecode.link_references["https://host/lib/Math.sol"]["Math"][0],
            LinkOffset {
                start: 10,
                length: 20
            }
        );
    }

    #[test]
    fn error_only_output() {
        let out = CompilerOutput::from_json(
            r#"{"errors":[{"severity":"error","type":"ParserError","message":"Expected ';'"}]}"#,
        )
        .unwrap();
        assert!(out.has_errors());
        assert_eq!(out.error_count(), 1);
        assert!(out.contracts.is_empty());
        assert!(out.errors[0].source_location.is_none());
    }

    #[test]
    fn empty_document() {
        let out = CompilerOutput::from_json("{}").unwrap();
        assert!(out.errors.is_empty());
        assert!(out.contracts_in("https://host/A.sol").is_none());
    }
}
