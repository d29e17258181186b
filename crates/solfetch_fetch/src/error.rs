//! Errors raised while retrieving source text.

/// A failed retrieval. Any of these aborts the whole resolution run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("request for {key} failed with status {status}")]
    Status {
        /// The key that was requested.
        key: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request never produced a response (DNS, TLS, timeout, reset...).
    #[error("failed to fetch {key}: {reason}")]
    Transport {
        /// The key that was requested.
        key: String,
        /// Description of the transport fault.
        reason: String,
    },

    /// A `file://` key could not be read.
    #[error("failed to read {key}: {source}")]
    Io {
        /// The key that was requested.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The key uses a scheme no fetcher understands.
    #[error("unsupported scheme '{scheme}' in {key}")]
    UnsupportedScheme {
        /// The key that was requested.
        key: String,
        /// The offending scheme.
        scheme: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Returns the key whose retrieval failed, if the error is tied to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            FetchError::Status { key, .. }
            | FetchError::Transport { key, .. }
            | FetchError::Io { key, .. }
            | FetchError::UnsupportedScheme { key, .. } => Some(key),
            FetchError::Client(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = FetchError::Status {
            key: "https://host/Missing.sol".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "request for https://host/Missing.sol failed with status 404"
        );
        assert_eq!(err.key(), Some("https://host/Missing.sol"));
    }

    #[test]
    fn client_error_has_no_key() {
        let err = FetchError::Client("tls backend unavailable".to_string());
        assert!(err.key().is_none());
        assert!(err.to_string().contains("tls backend unavailable"));
    }

    #[test]
    fn unsupported_scheme_display() {
        let err = FetchError::UnsupportedScheme {
            key: "ftp://host/A.sol".to_string(),
            scheme: "ftp".to_string(),
        };
        assert!(err.to_string().contains("'ftp'"));
    }
}
