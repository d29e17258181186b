//! Errors that abort a compilation.

/// A fatal compilation failure. No artifact is returned alongside it.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler produced no contracts for the entry source.
    #[error("compiled contract appears to be empty: no contracts in {entry}")]
    EmptyCompilation {
        /// The entry source name.
        entry: String,
    },

    /// The requested contract is not defined in the entry source.
    #[error("contract '{contract}' not found in {entry} (available: {})", .available.join(", "))]
    ContractNotFound {
        /// The requested contract name.
        contract: String,
        /// The entry source name.
        entry: String,
        /// Contracts the entry source does define.
        available: Vec<String>,
    },

    /// The compiler reported one or more errors.
    #[error("compilation of {entry} failed with {error_count} error(s)")]
    Diagnostics {
        /// The entry source name.
        entry: String,
        /// Number of error-severity diagnostics.
        error_count: usize,
    },

    /// The compiler could not be run.
    #[error("compiler invocation failed: {0}")]
    Compiler(String),

    /// The compiler's output was not a valid standard-JSON document.
    #[error("invalid compiler output: {0}")]
    InvalidOutput(String),
}
