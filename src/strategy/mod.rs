//! Strategy module: applies the fetcher to a whole batch
//!
//! This module contains:
//! - `StrategyKind`, the closed set of concurrency models
//! - The `Strategy` trait and its three implementations
//! - The `Dispatcher`, which owns strategy selection and nothing else
//!
//! Whatever the strategy, `results[i]` answers `urls[i]`, every URL yields
//! exactly one record, and dispatch only returns once every unit of work has
//! reached a terminal state.

mod event_loop;
mod process_pool;
mod thread_pool;

pub use event_loop::EventLoop;
pub use process_pool::{default_worker_program, ProcessPool, WORKER_PROGRAM_NAME};
pub use thread_pool::ThreadPool;

use crate::config::{validate, Config};
use crate::fetcher::{FetchOutcome, FetchRecord, HttpFetcher, Recorder};
use crate::{ConfigError, Result};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Instant;

/// The concurrency model used to run a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// OS threads sharing one address space
    ThreadPool,

    /// Isolated worker processes, one per unit of work
    ProcessPool,

    /// Cooperative tasks on a single thread
    EventLoop,
}

impl StrategyKind {
    /// Every strategy, in the order `--method all` runs them
    pub const ALL: [StrategyKind; 3] = [Self::ThreadPool, Self::ProcessPool, Self::EventLoop];

    /// The name used on the command line
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::ThreadPool => "threading",
            Self::ProcessPool => "multiprocessing",
            Self::EventLoop => "asyncio",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threading" | "thread-pool" => Ok(Self::ThreadPool),
            "multiprocessing" | "process-pool" => Ok(Self::ProcessPool),
            "asyncio" | "event-loop" => Ok(Self::EventLoop),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

/// Results of one dispatched batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub strategy: StrategyKind,

    /// One record per submitted URL, in submission order
    pub results: Vec<FetchRecord>,

    /// Wall time for the whole batch, in seconds
    pub total_time: f64,
}

impl BatchReport {
    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.results.len() - self.successes()
    }

    pub fn outcomes(&self) -> Vec<&FetchOutcome> {
        self.results.iter().map(|r| &r.outcome).collect()
    }
}

/// A concurrency model able to run a whole batch
pub trait Strategy {
    fn kind(&self) -> StrategyKind;

    /// Runs every URL to a terminal state, returning records in submission order
    fn run(&self, urls: &[String]) -> Result<Vec<FetchRecord>>;

    /// Runs the batch and measures its total wall time
    fn execute(&self, urls: &[String]) -> Result<BatchReport> {
        let started = Instant::now();
        let results = self.run(urls)?;
        let total_time = started.elapsed().as_secs_f64();

        debug_assert_eq!(results.len(), urls.len());

        Ok(BatchReport {
            strategy: self.kind(),
            results,
            total_time,
        })
    }
}

/// Pool size for the thread strategy
///
/// Units of work are network-bound, so the pool runs a few more threads than
/// there are cores.
pub fn default_thread_workers() -> usize {
    (available_parallelism() + 4).min(32)
}

/// Pool size for the process strategy
pub fn default_process_workers() -> usize {
    available_parallelism()
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Selects a strategy and delegates the batch to it
pub struct Dispatcher {
    config: Config,
    fetcher: HttpFetcher,
    recorder: Recorder,
}

impl Dispatcher {
    /// Creates a dispatcher from a configuration
    ///
    /// The output directory must already exist; it is not created here.
    ///
    /// # Returns
    ///
    /// * `Ok(Dispatcher)` - Ready to dispatch batches
    /// * `Err(DispatchError)` - Invalid config or HTTP client construction failed
    ///
    /// # Panics
    ///
    /// Panics if called from inside a tokio runtime: the blocking HTTP client
    /// starts and owns its own runtime. Async callers should construct the
    /// dispatcher inside `tokio::task::spawn_blocking`.
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;
        let fetcher = HttpFetcher::from_config(&config.fetch)?;
        let recorder = Recorder::new(config.fetch.timing);

        Ok(Self {
            config,
            fetcher,
            recorder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the batch under the given strategy
    ///
    /// Per-item failures are reported inside the returned records. An `Err` here
    /// means no unit of work was started.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a tokio runtime, since the event loop
    /// blocks on a runtime of its own. Call it from `spawn_blocking` instead.
    pub fn dispatch(&self, urls: &[String], kind: StrategyKind) -> Result<BatchReport> {
        tracing::info!("Dispatching {} URLs with the {} strategy", urls.len(), kind);

        let report = match kind {
            StrategyKind::ThreadPool => {
                let workers = self.thread_workers();
                ThreadPool::new(&self.fetcher, self.recorder, workers).execute(urls)?
            }
            StrategyKind::ProcessPool => self.process_pool()?.execute(urls)?,
            StrategyKind::EventLoop => {
                EventLoop::new(&self.fetcher, self.recorder).execute(urls)?
            }
        };

        tracing::info!(
            "{} finished: {} succeeded, {} failed in {:.2}s",
            kind,
            report.successes(),
            report.failures(),
            report.total_time
        );

        Ok(report)
    }

    /// Parses a strategy name, then dispatches
    ///
    /// An unknown name fails before any network activity.
    pub fn dispatch_named(&self, urls: &[String], name: &str) -> Result<BatchReport> {
        let kind: StrategyKind = name.parse()?;
        self.dispatch(urls, kind)
    }

    /// Runs the same batch under every strategy, one after another
    ///
    /// The worker program is checked before the first strategy runs, so a
    /// missing worker fails the comparison before any request is sent.
    pub fn compare(&self, urls: &[String]) -> Result<Vec<BatchReport>> {
        self.process_pool()?;

        StrategyKind::ALL
            .iter()
            .map(|kind| self.dispatch(urls, *kind))
            .collect()
    }

    fn process_pool(&self) -> Result<ProcessPool> {
        let program = self.worker_program()?;
        ProcessPool::new(program, &self.config.fetch, self.process_workers())
    }

    fn thread_workers(&self) -> usize {
        self.config
            .pool
            .workers
            .unwrap_or_else(default_thread_workers)
    }

    fn process_workers(&self) -> usize {
        self.config
            .pool
            .workers
            .unwrap_or_else(default_process_workers)
    }

    fn worker_program(&self) -> std::result::Result<std::path::PathBuf, ConfigError> {
        self.config
            .pool
            .worker_program
            .clone()
            .or_else(default_worker_program)
            .ok_or_else(|| ConfigError::MissingWorker(WORKER_PROGRAM_NAME.into()))
    }
}
