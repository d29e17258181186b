//! Parsing and validation of `solfetch.toml` configuration files.
//!
//! The configuration names the entry file and parameter document to
//! resolve, the compiler settings used for the build, and the resolver's
//! concurrency and cycle policy.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
