//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlStatus`: the externally visible progress record of the active run
//! - `StatusPublisher` / `StatusReader`: single-writer, multi-reader cell holding it
//! - `Step` / `StepOutcome`: failure policy for every fallible step of a page visit

mod status;
mod step;

// Re-export main types
pub use status::{CrawlStatus, StatusPublisher, StatusReader};
pub use step::{FailurePolicy, RunAborted, Step, StepOutcome};
