//! Configuration module for Batch-Fetch
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so an empty file (or no file
//! at all) yields a usable [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use batch_fetch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("batch-fetch.toml")).unwrap();
//! println!("Saving into: {}", config.fetch.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, PoolConfig, TimingPolicy, DEFAULT_USER_AGENT};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
