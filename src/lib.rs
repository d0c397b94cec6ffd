//! Flowmap: a single-domain interaction mapper
//!
//! This crate crawls one web domain from a seed URL, records the link graph,
//! captures calls-to-action and forms on every visited page, and derives the
//! cycle-free navigation paths ("user flows") through the discovered graph.

pub mod config;
pub mod control;
pub mod crawler;
pub mod flows;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Flowmap operations
#[derive(Debug, Error)]
pub enum FlowmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page backend error: {0}")]
    Driver(#[from] DriverError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised by a page backend
///
/// Everything except [`DriverError::Launch`] is a transient page error: the
/// crawl logs it and continues with whatever page state is available.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to launch page backend: {0}")]
    Launch(String),

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),

    #[error("No page is loaded")]
    NoPage,
}

/// Errors raised while writing an export target
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Errors raised at the control boundary
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("A crawl is already running")]
    AlreadyRunning,

    #[error("A seed URL is required")]
    EmptySeed,
}

/// Result type alias for Flowmap operations
pub type Result<T> = std::result::Result<T, FlowmapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page backend operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Result type alias for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

// Re-export commonly used types
pub use config::Config;
pub use control::CrawlController;
pub use crawler::{CrawlGraph, CrawlOutput, Crawler};
pub use flows::{enumerate_flows, Flow, FlowLimits};
pub use pipeline::{run_pipeline, run_pipeline_with_output, PipelineOutput, RunReport};
pub use state::{CrawlStatus, StatusPublisher, StatusReader};
pub use url::{CanonicalUrl, Scope};
