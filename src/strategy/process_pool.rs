//! Process-pool strategy
//!
//! Each unit of work runs in its own `batch-fetch-worker` child process. The
//! request goes to the child's stdin as JSON and the `FetchRecord` comes back
//! on its stdout, so nothing is shared between units except the filesystem.
//! A bounded number of supervisor threads keep at most `workers` children
//! alive at once.

use crate::config::FetchConfig;
use crate::fetcher::{FetchRecord, Recorder};
use crate::strategy::thread_pool::run_pooled;
use crate::strategy::{Strategy, StrategyKind};
use crate::worker::WorkerRequest;
use crate::{ConfigError, FetchError, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

/// File name of the worker executable
pub const WORKER_PROGRAM_NAME: &str = "batch-fetch-worker";

/// Locates the worker executable next to the running binary
pub fn default_worker_program() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.with_file_name(format!(
        "{}{}",
        WORKER_PROGRAM_NAME,
        std::env::consts::EXE_SUFFIX
    )))
}

/// Runs each unit of work in an isolated worker process
pub struct ProcessPool {
    program: PathBuf,
    output_dir: PathBuf,
    user_agent: String,
    recorder: Recorder,
    workers: usize,
}

impl ProcessPool {
    /// Creates a process pool
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessPool)` - The worker program exists
    /// * `Err(ConfigError::MissingWorker)` - It does not; no unit is started
    pub fn new(program: PathBuf, fetch: &FetchConfig, workers: usize) -> Result<Self> {
        if !program.is_file() {
            return Err(ConfigError::MissingWorker(program).into());
        }

        Ok(Self {
            program,
            output_dir: fetch.output_dir.clone(),
            user_agent: fetch.user_agent.clone(),
            recorder: Recorder::new(fetch.timing),
            workers,
        })
    }

    fn run_unit(&self, url: &str) -> FetchRecord {
        let started = Instant::now();
        match self.spawn_worker(url) {
            Ok(record) => record,
            Err(e) => self.recorder.fail(url, started, e),
        }
    }

    /// Sends one request to a fresh worker process and waits for its record
    fn spawn_worker(&self, url: &str) -> std::result::Result<FetchRecord, FetchError> {
        let worker_error = |reason: String| FetchError::Worker {
            url: url.to_string(),
            reason,
        };

        let request = WorkerRequest {
            url: url.to_string(),
            output_dir: self.output_dir.clone(),
            timing: self.recorder.policy(),
            user_agent: self.user_agent.clone(),
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| worker_error(format!("cannot encode request: {}", e)))?;

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| worker_error(format!("cannot start worker: {}", e)))?;

        tracing::debug!("Worker {} started for {}", child.id(), url);

        // Dropping stdin after the write signals end of request
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| worker_error(format!("cannot collect result: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.lines().rev().find(|line| !line.trim().is_empty()) {
                Some(detail) => format!("{}: {}", output.status, detail.trim()),
                None => output.status.to_string(),
            };
            return Err(worker_error(reason));
        }

        sent.map_err(|e| worker_error(format!("cannot send request: {}", e)))?;

        let record: FetchRecord = serde_json::from_slice(&output.stdout)
            .map_err(|e| worker_error(format!("malformed result: {}", e)))?;

        if record.url != url {
            return Err(worker_error(format!(
                "result answers {} instead",
                record.url
            )));
        }

        Ok(record)
    }
}

impl Strategy for ProcessPool {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ProcessPool
    }

    fn run(&self, urls: &[String]) -> Result<Vec<FetchRecord>> {
        Ok(run_pooled(
            urls,
            self.workers,
            self.recorder,
            "fetch-process",
            |url| self.run_unit(url),
        ))
    }
}
