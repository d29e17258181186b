//! solfetch CLI: resolve and compile remote Solidity import graphs.
//!
//! Provides `solfetch fetch` for resolving an entry file and every file it
//! transitively imports, and `solfetch build` for compiling the resolved
//! graph with `solc` and printing the selected contract's artifact.

#![warn(missing_docs)]

mod build;
mod fetch;
mod logging;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// solfetch: fetch, parameterize and compile remote Solidity sources.
#[derive(Parser, Debug)]
#[command(name = "solfetch", version, about = "Remote Solidity import resolver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `solfetch.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the import graph and compile the entry file.
    Build(BuildArgs),
    /// Resolve the import graph without compiling.
    Fetch(FetchArgs),
}

/// Options shared by every command that resolves a graph.
#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Entry file URL or local path. Defaults to `source.entry` from the config.
    pub entry: Option<String>,

    /// URL of the JSON parameter document used for `$(NAME)` substitution.
    #[arg(short, long)]
    pub params: Option<String>,

    /// Maximum number of concurrent fetches.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Accept cyclic imports instead of failing.
    #[arg(long)]
    pub allow_cycles: bool,
}

/// Arguments for the `solfetch build` subcommand.
#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Resolution options.
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Contract to extract (default: the first by name).
    #[arg(long)]
    pub contract: Option<String>,

    /// Output format for the artifact and diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Target EVM version.
    #[arg(long)]
    pub evm_version: Option<String>,

    /// Optimizer runs.
    #[arg(long)]
    pub runs: Option<u32>,

    /// Disable the optimizer.
    #[arg(long)]
    pub no_optimize: bool,

    /// Compiler binary.
    #[arg(long)]
    pub solc: Option<String>,
}

/// Arguments for the `solfetch fetch` subcommand.
#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Resolution options.
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Write the substituted sources under this directory.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Output format for the source listing.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    logging::init(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Fetch(ref args) => fetch::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
