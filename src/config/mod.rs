//! Configuration module for Flowmap
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to the built-in
//! defaults (page budget 10, 30s navigation timeout, flow depth 5, ...).
//!
//! # Example
//!
//! ```no_run
//! use flowmap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("flowmap.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.page_budget);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Backend, Config, CrawlerConfig, FlowConfig, OutputConfig, ServerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
