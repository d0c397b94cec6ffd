//! Crawler module for page visiting and record extraction
//!
//! This module contains the core crawling logic, including:
//! - The page backend interface and its HTTP and Chromium implementations
//! - HTML extraction of calls-to-action, forms and links
//! - The budgeted frontier and the link graph
//! - Overall crawl session orchestration

#[cfg(feature = "chromium")]
mod browser;
mod capture;
mod driver;
mod fetcher;
mod frontier;
mod graph;
mod parser;
mod session;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "chromium")]
pub use browser::{ChromiumDriver, ChromiumLauncher};
pub use capture::{
    page_name, safe_filename, ElementRecord, FormRecord, ScreenshotSink, StoredScreenshot,
};
pub use driver::{
    BoundingBox, ClipBox, DriverLauncher, FormInput, PageDriver, RawElement, RawForm,
    SubmitButton,
};
pub use fetcher::{build_http_client, HttpDriver, HttpLauncher};
pub use frontier::{Frontier, QueuedUrl};
pub use graph::CrawlGraph;
pub use parser::{extract_elements, extract_forms, extract_links, parse_html, ParsedPage};
pub use session::{CrawlOutput, CrawlSettings, Crawler};

use crate::config::{Backend, CrawlerConfig};
use crate::{DriverError, DriverResult};
use async_trait::async_trait;

/// Builds the launcher for the configured backend
///
/// Selecting `chromium` in a build without the `chromium` feature yields a
/// launcher that fails on launch, which ends the run with a recorded error.
pub fn launcher_for(config: &CrawlerConfig) -> Box<dyn DriverLauncher> {
    match config.backend {
        Backend::Http => Box::new(HttpLauncher::from_config(config)),
        #[cfg(feature = "chromium")]
        Backend::Chromium => Box::new(ChromiumLauncher::from_config(config)),
        #[cfg(not(feature = "chromium"))]
        Backend::Chromium => Box::new(UnavailableLauncher("chromium")),
    }
}

/// Launcher for a backend this build does not include
#[cfg_attr(feature = "chromium", allow(dead_code))]
struct UnavailableLauncher(&'static str);

#[async_trait]
impl DriverLauncher for UnavailableLauncher {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>> {
        Err(DriverError::Launch(format!(
            "the {} backend is not compiled in (enable the `{}` feature)",
            self.0, self.0
        )))
    }
}
