//! Export target trait and the data handed to it
//!
//! Every export file is produced by one [`ExportTarget`]. Targets are
//! independent: a failure in one never prevents the others from running.

use crate::crawler::CrawlOutput;
use crate::flows::Flow;
use crate::ExportResult;
use std::path::Path;

/// Everything an export target may read
#[derive(Debug, Clone, Copy)]
pub struct ExportData<'a> {
    /// Result of the crawl run
    pub crawl: &'a CrawlOutput,

    /// Flows enumerated from the crawl graph
    pub flows: &'a [Flow],
}

/// One export file
pub trait ExportTarget: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// File name inside the export directory
    fn file_name(&self) -> &'static str;

    /// Writes the export to `path`, replacing any existing file
    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()>;
}
