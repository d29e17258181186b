//! Log output for the CLI.
//!
//! Library crates emit `tracing` events; this installs the subscriber that
//! prints them to stderr. `RUST_LOG` takes precedence over the level implied
//! by `--quiet` and `--verbose`.

use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

/// Returns the default filter directive for the given flags.
pub fn default_directive(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber. Does nothing if one is already set.
pub fn init(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(global.verbose)
        .without_time()
        .try_init();
}
