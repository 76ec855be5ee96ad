//! Plain-text batch report
//!
//! One line per result in input order, then the total:
//!
//! ```text
//! Downloaded a.jpg in 0.12 seconds
//! Downloaded HTTP 404 Not Found for http://host/missing.jpg in 0.03 seconds
//! Total time: 0.15 seconds
//! ```

use crate::fetcher::FetchRecord;
use crate::strategy::BatchReport;
use std::io::{self, Write};

/// Renders one result line
pub fn format_result_line(record: &FetchRecord) -> String {
    format!(
        "Downloaded {} in {:.2} seconds",
        record.outcome.label(),
        record.timing
    )
}

/// Renders the batch total line
pub fn format_total_line(total_time: f64) -> String {
    format!("Total time: {:.2} seconds", total_time)
}

/// Writes the full report to `out`
pub fn write_report<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    for record in &report.results {
        writeln!(out, "{}", format_result_line(record))?;
    }
    writeln!(out, "{}", format_total_line(report.total_time))
}

/// Prints the full report to stdout
pub fn print_report(report: &BatchReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report)
}
