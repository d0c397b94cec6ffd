//! One complete run: crawl, enumerate flows, export
//!
//! Exports run even when the crawl ended early, so a failed run still leaves
//! whatever partial results it gathered on disk.

use crate::config::Config;
use crate::crawler::{CrawlOutput, CrawlSettings, Crawler, DriverLauncher};
use crate::flows::{enumerate_flows, Flow, FlowLimits};
use crate::output::{archive_screenshots, default_targets, export_all, Artifact, ExportData};
use crate::state::StatusPublisher;
use serde::Serialize;
use std::time::Instant;

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub pages_crawled: usize,
    pub ctas_found: usize,
    pub forms_found: usize,
    pub flows_generated: usize,

    /// Files written by the export pass
    pub artifacts: Vec<Artifact>,

    /// Fatal error that ended the crawl early
    pub error: Option<String>,
}

impl RunReport {
    fn new(crawl: &CrawlOutput, flows: &[Flow], artifacts: Vec<Artifact>) -> Self {
        Self {
            pages_crawled: crawl.pages_crawled(),
            ctas_found: crawl.elements.len(),
            forms_found: crawl.forms.len(),
            flows_generated: flows.len(),
            artifacts,
            error: crawl.error.clone(),
        }
    }

    /// Looks up an artifact by file name
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

/// Runs a full crawl of `seed` and writes every export
pub async fn run_pipeline(
    config: &Config,
    seed: &str,
    launcher: &dyn DriverLauncher,
    status: &StatusPublisher,
) -> RunReport {
    let (_, report) = run_pipeline_with_output(config, seed, launcher, status).await;
    report
}

/// Like [`run_pipeline`], also handing back the crawl and its flows
pub async fn run_pipeline_with_output(
    config: &Config,
    seed: &str,
    launcher: &dyn DriverLauncher,
    status: &StatusPublisher,
) -> (PipelineOutput, RunReport) {
    let crawler = Crawler::new(CrawlSettings::from_config(&config.crawler, &config.output));
    let crawl = crawler.crawl(seed, launcher, status).await;

    let start_time = Instant::now();
    let flows = enumerate_flows(
        crawl.seed.as_str(),
        &crawl.graph,
        FlowLimits::from_config(&config.flows),
    );
    tracing::info!(
        "Generated {} flows in {:?}",
        flows.len(),
        start_time.elapsed()
    );

    let data = ExportData {
        crawl: &crawl,
        flows: &flows,
    };
    let mut artifacts = export_all(&config.output.export_dir, &data, &default_targets());

    let archive_path = config.output.screenshot_archive_path();
    match archive_screenshots(&config.output.public_screenshot_dir, &archive_path) {
        Ok(Some(path)) => artifacts.push(Artifact {
            name: "screenshots.zip",
            path,
        }),
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to archive screenshots: {}", e),
    }

    let report = RunReport::new(&crawl, &flows, artifacts);
    tracing::info!(
        "Run finished: {} pages, {} CTAs, {} forms, {} flows",
        report.pages_crawled,
        report.ctas_found,
        report.forms_found,
        report.flows_generated
    );

    (PipelineOutput { crawl, flows }, report)
}

/// Crawl output and flows of a finished run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub crawl: CrawlOutput,
    pub flows: Vec<Flow>,
}
