//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `solfetch.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("source.entry".to_string());
        assert_eq!(format!("{err}"), "missing required field: source.entry");
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("unknown evm version 'parus'".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: unknown evm version 'parus'"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ConfigError::from(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
