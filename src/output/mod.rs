//! Output module for writing run artifacts
//!
//! This module handles:
//! - CSV and JSON record exports
//! - The SDR and flow workbooks
//! - A markdown summary and run statistics
//! - Zipping the public screenshots

mod archive;
mod markdown;
mod spreadsheet;
pub mod stats;
mod tabular;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use archive::archive_screenshots;
pub use markdown::{format_markdown_summary, MarkdownSummary};
pub use spreadsheet::{FlowWorkbook, SdrWorkbook, FLOW_COLUMN, SDR_COLUMNS};
pub use stats::{print_statistics, CrawlStatistics};
pub use tabular::{CtaCsv, FormCsv, RecordsJson, CTA_CSV_COLUMNS, FORM_CSV_COLUMNS};
pub use traits::{ExportData, ExportTarget};

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A file written by an export pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: &'static str,
    pub path: PathBuf,
}

/// The exports every run writes, in write order
pub fn default_targets() -> Vec<Box<dyn ExportTarget>> {
    vec![
        Box::new(CtaCsv),
        Box::new(FormCsv),
        Box::new(RecordsJson),
        Box::new(SdrWorkbook),
        Box::new(FlowWorkbook),
        Box::new(MarkdownSummary),
    ]
}

/// Writes each target into `export_dir`
///
/// Exports are best-effort: a target that fails is logged and skipped, and
/// the rest still run. Returns the artifacts that were written.
pub fn export_all(
    export_dir: &Path,
    data: &ExportData<'_>,
    targets: &[Box<dyn ExportTarget>],
) -> Vec<Artifact> {
    if let Err(e) = std::fs::create_dir_all(export_dir) {
        tracing::error!(
            "Failed to create export directory {}: {}",
            export_dir.display(),
            e
        );
        return Vec::new();
    }

    let mut artifacts = Vec::with_capacity(targets.len());
    for target in targets {
        let path = export_dir.join(target.file_name());
        match target.write(data, &path) {
            Ok(()) => {
                tracing::info!("Wrote {} to {}", target.name(), path.display());
                artifacts.push(Artifact {
                    name: target.file_name(),
                    path,
                });
            }
            Err(e) => tracing::warn!("Failed to write {}: {}", target.name(), e),
        }
    }
    artifacts
}
