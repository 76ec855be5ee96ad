//! Output module for rendering batch results
//!
//! This module handles:
//! - The per-result and total lines printed by the CLI
//! - Summary statistics used when comparing strategies

mod report;
pub mod stats;

pub use report::{format_result_line, format_total_line, print_report, write_report};
pub use stats::{print_comparison, BatchStatistics};
