//! Markdown summary generation
//!
//! This module writes `crawl_summary.md`, a human-readable overview of a run:
//! counts, visited pages, and the first flows.

use crate::output::stats::CrawlStatistics;
use crate::output::traits::{ExportData, ExportTarget};
use crate::ExportResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Flows listed in the summary before it is cut short
const FLOW_PREVIEW: usize = 20;

/// `crawl_summary.md`
pub struct MarkdownSummary;

impl ExportTarget for MarkdownSummary {
    fn name(&self) -> &'static str {
        "markdown summary"
    }

    fn file_name(&self) -> &'static str {
        "crawl_summary.md"
    }

    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()> {
        let markdown = format_markdown_summary(data);
        let mut file = File::create(path)?;
        file.write_all(markdown.as_bytes())?;
        Ok(())
    }
}

/// Formats a run as markdown
pub fn format_markdown_summary(data: &ExportData<'_>) -> String {
    let stats = CrawlStatistics::collect(data);
    let mut md = String::new();

    md.push_str("# Flowmap Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", stats.seed));
    md.push_str(&format!("- **Domain**: {}\n", stats.domain));
    match &stats.error {
        Some(error) => md.push_str(&format!("- **Status**: ended early ({})\n\n", error)),
        None => md.push_str("- **Status**: completed\n\n"),
    }

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", stats.pages_crawled()));
    md.push_str(&format!("- **Links Recorded**: {}\n", stats.total_links));
    md.push_str(&format!("- **CTAs Found**: {}\n", stats.ctas_found));
    md.push_str(&format!("- **Forms Found**: {}\n", stats.forms_found));
    md.push_str(&format!(
        "- **Screenshot Coverage**: {:.2}%\n",
        stats.screenshot_coverage()
    ));
    md.push_str(&format!("- **Flows Generated**: {}\n\n", stats.flows_generated));

    // CTA breakdown
    if !stats.ctas_by_type.is_empty() {
        md.push_str("## CTAs by Element Type\n\n");
        md.push_str("| Element | Count |\n");
        md.push_str("|---------|-------|\n");
        for (element_type, count) in &stats.ctas_by_type {
            md.push_str(&format!("| {} | {} |\n", element_type, count));
        }
        md.push('\n');
    }

    // Visited pages
    if !data.crawl.visited.is_empty() {
        md.push_str("## Pages Visited\n\n");
        md.push_str("| # | Page | Outbound Links |\n");
        md.push_str("|---|------|----------------|\n");
        for (i, page) in data.crawl.visited.iter().enumerate() {
            let links = data.crawl.graph.neighbors(page).map_or(0, |n| n.len());
            md.push_str(&format!("| {} | {} | {} |\n", i + 1, page, links));
        }
        md.push('\n');
    }

    // Flows
    if !data.flows.is_empty() {
        md.push_str("## User Flows\n\n");
        for flow in data.flows.iter().take(FLOW_PREVIEW) {
            md.push_str(&format!("- {}\n", flow));
        }
        if data.flows.len() > FLOW_PREVIEW {
            md.push_str(&format!(
                "\n... and {} more\n",
                data.flows.len() - FLOW_PREVIEW
            ));
        }
        md.push('\n');
    }

    md
}
