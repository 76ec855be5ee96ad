use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// User agent sent when the config does not name one
pub const DEFAULT_USER_AGENT: &str = concat!("batch-fetch/", env!("CARGO_PKG_VERSION"));

/// Main configuration structure for Batch-Fetch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub pool: PoolConfig,
}

/// Per-item fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Directory the downloaded files are written into
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// How per-item timing is reported
    pub timing: TimingPolicy,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            timing: TimingPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Worker pool sizing for the thread and process strategies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of concurrent workers (defaults to available parallelism)
    pub workers: Option<usize>,

    /// Path to the `batch-fetch-worker` executable used by the process pool
    #[serde(rename = "worker-program")]
    pub worker_program: Option<PathBuf>,
}

/// Per-item timing policy
///
/// The batch total is always elapsed wall time, whichever policy is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingPolicy {
    /// Seconds between the start and the end of the unit of work
    #[default]
    Elapsed,

    /// Unix timestamp (fractional seconds) at which the unit completed
    CompletedAt,
}

impl TimingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elapsed => "elapsed",
            Self::CompletedAt => "completed-at",
        }
    }
}

impl FromStr for TimingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elapsed" | "duration" => Ok(Self::Elapsed),
            "completed-at" | "timestamp" => Ok(Self::CompletedAt),
            _ => Err(ConfigError::UnknownTiming(s.to_string())),
        }
    }
}

impl fmt::Display for TimingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
