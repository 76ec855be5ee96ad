//! Batch-Fetch main entry point
//!
//! This is the command-line interface for the Batch-Fetch downloader.

use anyhow::Context;
use batch_fetch::config::{load_config, Config, TimingPolicy};
use batch_fetch::output::{print_comparison, print_report};
use batch_fetch::{Dispatcher, StrategyKind};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Batch-Fetch: download a batch of URLs concurrently
///
/// Each URL is saved under its final path segment. The concurrency model is
/// chosen with --method; `all` runs the batch once per model and compares them.
#[derive(Parser, Debug)]
#[command(name = "batch-fetch")]
#[command(version)]
#[command(about = "Download a batch of URLs with a selectable concurrency model", long_about = None)]
struct Cli {
    /// URLs to download
    #[arg(value_name = "URL", required = true, num_args = 1..)]
    urls: Vec<String>,

    /// Download method: threading, multiprocessing, asyncio, or all
    #[arg(long, default_value = "threading")]
    method: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory to save files into (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum concurrent workers for the thread and process pools
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-item timing: elapsed or completed-at
    #[arg(long)]
    timing: Option<TimingPolicy>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Which strategies a run covers
enum Selection {
    One(StrategyKind),
    All,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Reject an unknown method before touching the filesystem or network
    let selection = if cli.method.eq_ignore_ascii_case("all") {
        Selection::All
    } else {
        Selection::One(cli.method.parse::<StrategyKind>()?)
    };

    let config = build_config(&cli)?;

    std::fs::create_dir_all(&config.fetch.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.fetch.output_dir.display()
        )
    })?;

    let dispatcher = Dispatcher::new(config)?;

    match selection {
        Selection::One(kind) => {
            let report = dispatcher.dispatch(&cli.urls, kind)?;
            print_report(&report)?;
        }
        Selection::All => {
            let reports = dispatcher.compare(&cli.urls)?;
            for report in &reports {
                println!("=== {} ===", report.strategy);
                print_report(report)?;
                println!();
            }
            print_comparison(&reports, dispatcher.config().fetch.timing);
        }
    }

    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.fetch.output_dir = dir.clone();
    }
    if let Some(workers) = cli.workers {
        config.pool.workers = Some(workers);
    }
    if let Some(timing) = cli.timing {
        config.fetch.timing = timing;
    }

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("batch_fetch=info,warn"),
            1 => EnvFilter::new("batch_fetch=debug,info"),
            2 => EnvFilter::new("batch_fetch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
