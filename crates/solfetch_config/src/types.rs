//! Configuration types deserialized from `solfetch.toml`.

use serde::Deserialize;

/// Default compiler binary.
pub const DEFAULT_SOLC: &str = "solc";
/// Default EVM version passed to the compiler.
pub const DEFAULT_EVM_VERSION: &str = "paris";
/// Default optimizer run count.
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 9_999_999;

/// EVM versions accepted by `compiler.evm_version`.
pub const KNOWN_EVM_VERSIONS: &[&str] = &[
    "homestead",
    "tangerineWhistle",
    "spuriousDragon",
    "byzantium",
    "constantinople",
    "petersburg",
    "istanbul",
    "berlin",
    "london",
    "paris",
    "shanghai",
    "cancun",
    "prague",
    "osaka",
];

/// The top-level configuration parsed from `solfetch.toml`.
#[derive(Debug, Deserialize)]
pub struct SolfetchConfig {
    /// Where the entry file and parameter document live.
    pub source: SourceConfig,
    /// Compiler invocation settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Resolver behaviour.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Locations of the entry file and the parameter document.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// Absolute URL of the entry source file.
    pub entry: String,
    /// Absolute URL of the JSON parameter document, if substitution is wanted.
    #[serde(default)]
    pub parameters: Option<String>,
}

/// Settings for building the compiler input.
#[derive(Debug, Deserialize)]
pub struct CompilerConfig {
    /// The `solc` binary to invoke.
    #[serde(default = "default_solc")]
    pub solc: String,
    /// Target EVM version.
    #[serde(default = "default_evm_version")]
    pub evm_version: String,
    /// Contract to extract from the entry file's output. First by name when unset.
    #[serde(default)]
    pub contract: Option<String>,
    /// Optimizer settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc: default_solc(),
            evm_version: default_evm_version(),
            contract: None,
            optimizer: OptimizerConfig::default(),
        }
    }
}

/// Optimizer settings forwarded to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OptimizerConfig {
    /// Whether the optimizer is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Expected number of runs of the deployed code.
    #[serde(default = "default_runs")]
    pub runs: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

/// Resolver concurrency and cycle policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound on fetches in flight at once. `1` resolves strictly sequentially.
    #[serde(default = "default_concurrency")]
    pub max_concurrent_fetches: usize,
    /// Accept import cycles instead of failing the run.
    #[serde(default)]
    pub allow_cyclic_imports: bool,
    /// Per-request timeout in seconds. No timeout when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_concurrency(),
            allow_cyclic_imports: false,
            request_timeout_secs: None,
        }
    }
}

fn default_solc() -> String {
    DEFAULT_SOLC.to_string()
}

fn default_evm_version() -> String {
    DEFAULT_EVM_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_runs() -> u32 {
    DEFAULT_OPTIMIZER_RUNS
}

fn default_concurrency() -> usize {
    1
}
