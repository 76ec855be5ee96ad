//! Fetcher module: one unit of work and its result record
//!
//! This module contains:
//! - The blocking and async HTTP fetchers that download a URL into the
//!   target directory under its basename
//! - The `Recorder` that wraps a fetch with timing capture and turns any
//!   failure into a `FetchRecord` instead of an error

mod http;
mod recorder;

pub use http::{
    build_async_client, build_blocking_client, file_name_for, AsyncFetcher, HttpFetcher,
};
pub use recorder::{completion_timestamp, Recorder};

use crate::state::UnitState;
use serde::{Deserialize, Serialize};

/// Terminal outcome of one unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FetchOutcome {
    /// Body was written to `filename` inside the target directory
    Success { filename: String },

    /// Human-readable description of what went wrong
    Failure { message: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The filename on success, the error description on failure
    pub fn label(&self) -> &str {
        match self {
            Self::Success { filename } => filename,
            Self::Failure { message } => message,
        }
    }

    /// The terminal state this outcome corresponds to
    pub fn state(&self) -> UnitState {
        match self {
            Self::Success { .. } => UnitState::Succeeded,
            Self::Failure { .. } => UnitState::Failed,
        }
    }
}

/// Result record for one URL of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRecord {
    /// The requested URL, exactly as submitted
    pub url: String,

    pub outcome: FetchOutcome,

    /// Elapsed seconds or completion timestamp, depending on the timing policy
    pub timing: f64,
}

impl FetchRecord {
    pub fn success(url: impl Into<String>, filename: impl Into<String>, timing: f64) -> Self {
        Self {
            url: url.into(),
            outcome: FetchOutcome::Success {
                filename: filename.into(),
            },
            timing,
        }
    }

    pub fn failure(url: impl Into<String>, message: impl Into<String>, timing: f64) -> Self {
        Self {
            url: url.into(),
            outcome: FetchOutcome::Failure {
                message: message.into(),
            },
            timing,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
