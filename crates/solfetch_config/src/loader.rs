//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{SolfetchConfig, KNOWN_EVM_VERSIONS};
use std::path::Path;
use url::Url;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "solfetch.toml";

/// Loads and validates `<dir>/solfetch.toml`.
pub fn load_config(dir: &Path) -> Result<SolfetchConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<SolfetchConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<SolfetchConfig, ConfigError> {
    let config: SolfetchConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &SolfetchConfig) -> Result<(), ConfigError> {
    if config.source.entry.trim().is_empty() {
        return Err(ConfigError::MissingField("source.entry".to_string()));
    }
    validate_location("source.entry", &config.source.entry)?;
    if let Some(parameters) = &config.source.parameters {
        validate_location("source.parameters", parameters)?;
    }
    if config.compiler.solc.trim().is_empty() {
        return Err(ConfigError::MissingField("compiler.solc".to_string()));
    }
    if !KNOWN_EVM_VERSIONS.contains(&config.compiler.evm_version.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "unknown evm version '{}'",
            config.compiler.evm_version
        )));
    }
    if config.resolver.max_concurrent_fetches == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.max_concurrent_fetches must be at least 1".to_string(),
        ));
    }
    if config.resolver.request_timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "resolver.request_timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_location(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::ValidationError(format!("{field} '{value}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::ValidationError(format!(
            "{field} '{value}' is not a hierarchical location"
        )));
    }
    Ok(())
}
