//! Errors that abort a resolution run.

use solfetch_common::InternalError;
use solfetch_fetch::FetchError;
use solfetch_source::KeyError;

/// A fatal resolution failure. No partial graph is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A file (or the parameter document) could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An import specifier or the entry location is not a valid location.
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    /// A file transitively imports itself.
    #[error("cyclic import of {key}: {}", .chain.join(" -> "))]
    CyclicImport {
        /// The key that was reached again.
        key: String,
        /// The import chain, starting and ending at `key`.
        chain: Vec<String>,
    },

    /// An invariant of the resolver was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_display() {
        let err = ResolveError::CyclicImport {
            key: "https://h/B.sol".to_string(),
            chain: vec![
                "https://h/B.sol".to_string(),
                "https://h/C.sol".to_string(),
                "https://h/B.sol".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cyclic import of https://h/B.sol: https://h/B.sol -> https://h/C.sol -> https://h/B.sol"
        );
    }

    #[test]
    fn fetch_error_is_transparent() {
        let err = ResolveError::from(FetchError::Status {
            key: "https://h/A.sol".to_string(),
            status: 500,
        });
        assert_eq!(err.to_string(), "request for https://h/A.sol failed with status 500");
    }
}
