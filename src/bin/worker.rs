//! Batch-Fetch worker process
//!
//! Spawned by the process-pool strategy: reads one request on stdin and writes
//! one result record on stdout. Logs go to stderr and are filtered by
//! `BATCH_FETCH_WORKER_LOG` (default: errors only).

use batch_fetch::worker::run_worker;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("BATCH_FETCH_WORKER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    match run_worker(io::stdin().lock(), io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
    }
}
