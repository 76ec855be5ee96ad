//! Statistics over dispatched batches
//!
//! Used by `--method all` to put the three strategies side by side.

use crate::config::TimingPolicy;
use crate::strategy::{BatchReport, StrategyKind};

/// Summary of a single batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatistics {
    pub strategy: StrategyKind,

    /// Number of URLs submitted
    pub total: usize,

    pub succeeded: usize,

    pub failed: usize,

    /// Largest per-item timing value (meaningful for elapsed timing only)
    pub slowest_item: f64,

    /// Wall time for the batch, in seconds
    pub total_time: f64,
}

impl BatchStatistics {
    pub fn from_report(report: &BatchReport) -> Self {
        let slowest_item = report
            .results
            .iter()
            .map(|r| r.timing)
            .fold(0.0_f64, f64::max);

        Self {
            strategy: report.strategy,
            total: report.results.len(),
            succeeded: report.successes(),
            failed: report.failures(),
            slowest_item,
            total_time: report.total_time,
        }
    }

    /// Sum of per-item time divided by wall time
    ///
    /// Roughly how many units were in flight on average. Returns `None` when
    /// the batch took no measurable time.
    pub fn overlap(&self, report: &BatchReport, policy: TimingPolicy) -> Option<f64> {
        if policy != TimingPolicy::Elapsed || self.total_time <= 0.0 {
            return None;
        }
        let busy: f64 = report.results.iter().map(|r| r.timing).sum();
        Some(busy / self.total_time)
    }
}

/// Prints one summary line per strategy
pub fn print_comparison(reports: &[BatchReport], policy: TimingPolicy) {
    println!("=== Strategy Comparison ===");
    for report in reports {
        let stats = BatchStatistics::from_report(report);
        let overlap = stats
            .overlap(report, policy)
            .map(|o| format!(", overlap x{:.1}", o))
            .unwrap_or_default();
        println!(
            "  {:<16} {}/{} succeeded, {} failed, total {:.2}s{}",
            stats.strategy.cli_name(),
            stats.succeeded,
            stats.total,
            stats.failed,
            stats.total_time,
            overlap
        );
    }

    if let Some(fastest) = reports
        .iter()
        .min_by(|a, b| a.total_time.total_cmp(&b.total_time))
    {
        println!("Fastest: {}", fastest.strategy);
    }
}
