//! Timing capture around a unit of work
//!
//! The `Recorder` is the boundary where per-item errors stop: whatever happens
//! inside the wrapped fetch, the caller gets back a `FetchRecord`.

use crate::config::TimingPolicy;
use crate::fetcher::FetchRecord;
use crate::state::UnitState;
use crate::FetchError;
use chrono::Utc;
use std::future::Future;
use std::time::Instant;

/// Returns the current Unix time in fractional seconds
pub fn completion_timestamp() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// Wraps fetches with timing capture and outcome normalization
#[derive(Debug, Clone, Copy, Default)]
pub struct Recorder {
    policy: TimingPolicy,
}

impl Recorder {
    pub fn new(policy: TimingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TimingPolicy {
        self.policy
    }

    /// Runs a blocking unit of work and records its outcome
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the unit answers for
    /// * `fetch` - Performs the fetch, returning the written file name
    pub fn record<F>(&self, url: &str, fetch: F) -> FetchRecord
    where
        F: FnOnce() -> Result<String, FetchError>,
    {
        let state = advance(url, UnitState::Pending, UnitState::InFlight);
        let started = Instant::now();
        let result = fetch();
        self.finish(url, state, started, result)
    }

    /// Async counterpart of [`Recorder::record`]
    pub async fn record_async<Fut>(&self, url: &str, fetch: Fut) -> FetchRecord
    where
        Fut: Future<Output = Result<String, FetchError>>,
    {
        let state = advance(url, UnitState::Pending, UnitState::InFlight);
        let started = Instant::now();
        let result = fetch.await;
        self.finish(url, state, started, result)
    }

    /// Records a failure for a unit whose fetch began at `started`
    ///
    /// Used when the fetch itself ran elsewhere (a worker process that crashed)
    /// and only the failure is known here.
    pub fn fail(&self, url: &str, started: Instant, error: FetchError) -> FetchRecord {
        self.finish(url, UnitState::InFlight, started, Err(error))
    }

    /// Records a failure for a unit that never reported back
    pub fn lost(&self, url: &str, reason: &str) -> FetchRecord {
        tracing::warn!("No result for {}: {}", url, reason);
        let timing = match self.policy {
            TimingPolicy::Elapsed => 0.0,
            TimingPolicy::CompletedAt => completion_timestamp(),
        };
        FetchRecord::failure(url, reason, timing)
    }

    fn finish(
        &self,
        url: &str,
        state: UnitState,
        started: Instant,
        result: Result<String, FetchError>,
    ) -> FetchRecord {
        let timing = match self.policy {
            TimingPolicy::Elapsed => started.elapsed().as_secs_f64(),
            TimingPolicy::CompletedAt => completion_timestamp(),
        };

        match result {
            Ok(filename) => {
                advance(url, state, UnitState::Succeeded);
                FetchRecord::success(url, filename, timing)
            }
            Err(e) => {
                advance(url, state, UnitState::Failed);
                tracing::warn!("Failed to fetch {}: {}", url, e);
                FetchRecord::failure(url, e.to_string(), timing)
            }
        }
    }
}

/// Applies a state transition, logging it
fn advance(url: &str, from: UnitState, to: UnitState) -> UnitState {
    match from.transition(to) {
        Ok(next) => {
            tracing::debug!("{}: {} -> {}", url, from, next);
            next
        }
        Err(e) => {
            tracing::error!("{}: {}", url, e);
            from
        }
    }
}
