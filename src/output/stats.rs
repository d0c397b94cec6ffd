//! Statistics over a finished run
//!
//! This module provides the counts shared by the markdown summary and the
//! CLI report.

use crate::output::traits::ExportData;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// The canonical seed
    pub seed: String,

    /// Domain the crawl was confined to
    pub domain: String,

    /// Pages visited, in visitation order
    pub visited: Vec<String>,

    /// Pages with at least one recorded outbound link
    pub linked_pages: usize,

    /// Distinct edges in the link graph
    pub total_links: usize,

    pub ctas_found: usize,
    pub forms_found: usize,
    pub flows_generated: usize,

    /// Hops in the longest flow
    pub longest_flow: usize,

    /// Records that carry a screenshot
    pub screenshots: usize,

    /// CTA count per element type
    pub ctas_by_type: BTreeMap<String, usize>,

    /// Fatal error that ended the run early
    pub error: Option<String>,
}

impl CrawlStatistics {
    /// Collects statistics from export data
    pub fn collect(data: &ExportData<'_>) -> Self {
        let crawl = data.crawl;

        let mut ctas_by_type = BTreeMap::new();
        for record in &crawl.elements {
            *ctas_by_type.entry(record.element_type.clone()).or_insert(0) += 1;
        }

        let screenshots = crawl
            .elements
            .iter()
            .filter(|r| r.screenshot_url.is_some())
            .count()
            + crawl
                .forms
                .iter()
                .filter(|r| r.form_screenshot_url.is_some())
                .count();

        Self {
            seed: crawl.seed.to_string(),
            domain: crawl.scope.domain().to_string(),
            visited: crawl.visited.iter().map(|u| u.to_string()).collect(),
            linked_pages: crawl.graph.page_count(),
            total_links: crawl.graph.edge_count(),
            ctas_found: crawl.elements.len(),
            forms_found: crawl.forms.len(),
            flows_generated: data.flows.len(),
            longest_flow: data.flows.iter().map(|f| f.hops()).max().unwrap_or(0),
            screenshots,
            ctas_by_type,
            error: crawl.error.clone(),
        }
    }

    pub fn pages_crawled(&self) -> usize {
        self.visited.len()
    }

    /// Share of records with a screenshot, as a percentage
    pub fn screenshot_coverage(&self) -> f64 {
        let records = self.ctas_found + self.forms_found;
        if records == 0 {
            return 0.0;
        }
        (self.screenshots as f64 / records as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Seed: {}", stats.seed);
    println!("  Domain: {}", stats.domain);
    println!("  Pages crawled: {}", stats.pages_crawled());
    println!(
        "  Links recorded: {} (from {} pages)",
        stats.total_links, stats.linked_pages
    );
    println!();

    println!("Records:");
    println!("  CTAs: {}", stats.ctas_found);
    println!("  Forms: {}", stats.forms_found);
    println!(
        "  Screenshots: {} ({:.1}% of records)",
        stats.screenshots,
        stats.screenshot_coverage()
    );
    println!();

    if !stats.ctas_by_type.is_empty() {
        println!("CTAs by Element Type:");
        let mut counts: Vec<_> = stats.ctas_by_type.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (element_type, count) in counts {
            println!("  {}: {}", element_type, count);
        }
        println!();
    }

    println!(
        "Flows: {} (longest {} hops)",
        stats.flows_generated, stats.longest_flow
    );

    if let Some(error) = &stats.error {
        println!();
        println!("Run ended early: {}", error);
    }
}
