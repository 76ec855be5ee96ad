//! Worker process protocol
//!
//! The process-pool strategy runs each unit of work in a `batch-fetch-worker`
//! child. The child reads one JSON [`WorkerRequest`] from stdin, performs the
//! fetch, and writes one JSON [`FetchRecord`] to stdout. Fetch failures travel
//! back as data; only protocol faults make the worker exit non-zero.

use crate::config::TimingPolicy;
use crate::fetcher::{FetchRecord, HttpFetcher, Recorder};
use crate::WorkerError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;

/// One unit of work, as sent to a worker process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub url: String,
    pub output_dir: PathBuf,
    pub timing: TimingPolicy,
    pub user_agent: String,
}

/// Serves one request read from `input`, writing the record to `output`
///
/// # Returns
///
/// * `Ok(FetchRecord)` - The record that was written (success or failure)
/// * `Err(WorkerError)` - The request could not be read or the record not written
pub fn run_worker<R: Read, W: Write>(input: R, mut output: W) -> Result<FetchRecord, WorkerError> {
    let request: WorkerRequest = serde_json::from_reader(input)?;
    tracing::debug!("Worker received {}", request.url);

    let fetcher = HttpFetcher::new(request.output_dir.clone(), &request.user_agent)?;
    let recorder = Recorder::new(request.timing);
    let record = recorder.record(&request.url, || fetcher.fetch_blocking(&request.url));

    serde_json::to_writer(&mut output, &record)?;
    output.write_all(b"\n")?;
    output.flush()?;

    Ok(record)
}
