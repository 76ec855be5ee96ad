//! Batch-Fetch: a concurrent batch downloader
//!
//! This crate fetches a batch of URLs and saves each response body under the
//! URL's final path segment, using one of three interchangeable concurrency
//! strategies: a worker-thread pool, a worker-process pool, or a
//! single-threaded event loop.

pub mod config;
pub mod fetcher;
pub mod output;
pub mod state;
pub mod strategy;
pub mod worker;

use std::path::PathBuf;
use thiserror::Error;

/// Hard failure of a batch dispatch
///
/// Per-item failures never surface here; they are reported as
/// [`fetcher::FetchOutcome::Failure`] records instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to start event loop: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::UnitState,
        to: state::UnitState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown strategy '{0}' (expected threading, multiprocessing or asyncio)")]
    UnknownStrategy(String),

    #[error("Unknown timing policy '{0}' (expected elapsed or completed-at)")]
    UnknownTiming(String),

    #[error("Worker program not found: {}", .0.display())]
    MissingWorker(PathBuf),
}

/// Failure of a single unit of work
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("URL has no file name: {0}")]
    NoFileName(String),

    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Worker process failed for {url}: {reason}")]
    Worker { url: String, reason: String },
}

/// Protocol faults inside a worker process
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed worker message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, TimingPolicy};
pub use fetcher::{FetchOutcome, FetchRecord};
pub use state::UnitState;
pub use strategy::{BatchReport, Dispatcher, StrategyKind};
