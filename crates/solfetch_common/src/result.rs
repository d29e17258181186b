//! Internal error type for violated invariants.

/// Result alias for operations that can only fail through a bug in solfetch.
pub type SolfetchResult<T> = Result<T, InternalError>;

/// An invariant violation inside solfetch, not a problem with user input.
///
/// Upstream failures, bad configuration and compiler diagnostics each have
/// their own error types; this one is reserved for states that should be
/// unreachable, such as the fetch limiter being closed mid-resolution.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("fetch limiter closed");
        assert_eq!(format!("{err}"), "internal error: fetch limiter closed");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "entry unit missing".to_string().into();
        assert_eq!(err.message, "entry unit missing");
    }

    #[test]
    fn result_alias() {
        let r: SolfetchResult<u8> = Err(InternalError::new("x"));
        assert!(r.is_err());
    }
}
