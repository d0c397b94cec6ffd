//! Crawl session - the main crawl loop
//!
//! One run visits pages breadth-first from the seed until the frontier is
//! drained or the page budget is used up. For every page it:
//! - Navigates and prepares the page (consent banner, lazy content)
//! - Records calls-to-action and forms, with screenshots where possible
//! - Follows in-scope links into the graph and the frontier
//!
//! All run state lives in values created per run; nothing survives between
//! runs except what is returned in [`CrawlOutput`].

use crate::config::{CrawlerConfig, OutputConfig};
use crate::crawler::capture::{
    element_clip, element_screenshot_name, form_clip, form_screenshot_name, ElementRecord,
    FormRecord, ScreenshotSink,
};
use crate::crawler::driver::{DriverLauncher, PageDriver, RawElement, RawForm};
use crate::crawler::frontier::{Frontier, QueuedUrl};
use crate::crawler::graph::CrawlGraph;
use crate::state::{RunAborted, StatusPublisher, Step, StepOutcome};
use crate::url::{normalize_seed, CanonicalUrl, Scope};
use std::time::{Duration, Instant};

/// Tunables of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Maximum number of distinct pages to visit
    pub page_budget: usize,

    /// Upper bound for one navigation
    pub navigation_timeout: Duration,

    /// Pause after scrolling, for lazy content to load
    pub settle_delay: Duration,

    /// Where screenshots go
    pub screenshots: ScreenshotSink,
}

impl CrawlSettings {
    pub fn from_config(crawler: &CrawlerConfig, output: &OutputConfig) -> Self {
        Self {
            page_budget: crawler.page_budget,
            navigation_timeout: crawler.navigation_timeout(),
            settle_delay: crawler.settle_delay(),
            screenshots: ScreenshotSink::new(
                output.screenshot_dir.clone(),
                output.public_screenshot_dir.clone(),
            ),
        }
    }
}

/// Everything a crawl run produced
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    /// The canonical seed (or the raw normalized seed if it failed validation)
    pub seed: CanonicalUrl,

    /// Scope derived from the seed
    pub scope: Scope,

    /// Link graph between visited pages and their in-scope targets
    pub graph: CrawlGraph,

    /// Visited pages in visitation order
    pub visited: Vec<CanonicalUrl>,

    /// Calls-to-action, in discovery order
    pub elements: Vec<ElementRecord>,

    /// Forms, in discovery order
    pub forms: Vec<FormRecord>,

    /// Error that ended the run early
    pub error: Option<String>,
}

impl CrawlOutput {
    fn new(seed: CanonicalUrl, scope: Scope) -> Self {
        Self {
            seed,
            scope,
            graph: CrawlGraph::new(),
            visited: Vec::new(),
            elements: Vec::new(),
            forms: Vec::new(),
            error: None,
        }
    }

    pub fn pages_crawled(&self) -> usize {
        self.visited.len()
    }
}

/// Runs crawls with fixed settings
#[derive(Debug, Clone)]
pub struct Crawler {
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(settings: CrawlSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls the domain of `seed`
    ///
    /// Progress is published to `status` throughout; when this returns the
    /// status is finalized with `completed` set. A backend that fails to
    /// launch ends the run with zero pages and the error recorded in both
    /// the status and the output.
    pub async fn crawl(
        &self,
        seed: &str,
        launcher: &dyn DriverLauncher,
        status: &StatusPublisher,
    ) -> CrawlOutput {
        status.begin(self.settings.page_budget);
        tokio::task::yield_now().await;

        let start_time = Instant::now();
        let seed = normalize_seed(seed);
        let scope = Scope::from_seed(&seed);
        let seed_key = scope.canonicalize_seed(&seed).unwrap_or_else(|| {
            tracing::warn!("Seed {} is not canonical, crawling it as given", seed);
            CanonicalUrl::unchecked(seed.clone())
        });

        tracing::info!(
            "Starting crawl of {} (domain {}, budget {})",
            seed_key,
            scope.domain(),
            self.settings.page_budget
        );

        if let Err(e) = self.settings.screenshots.prepare().await {
            tracing::warn!("Failed to create screenshot directories: {}", e);
        }

        let mut frontier = Frontier::new(self.settings.page_budget);
        frontier.push_seed(seed_key.clone());
        let mut output = CrawlOutput::new(seed_key, scope);

        match StepOutcome::assess(Step::Launch, launcher.launch().await) {
            StepOutcome::Ok(mut driver) => {
                if let Err(e) = self
                    .drive(driver.as_mut(), &mut frontier, &mut output, status)
                    .await
                {
                    status.fail(&e);
                    output.error = Some(e.to_string());
                }

                let closed = StepOutcome::assess(Step::Close, driver.close().await);
                if let Err(e) = closed.recover(output.seed.as_str()) {
                    tracing::error!("Failed to close page backend: {}", e);
                }
            }
            StepOutcome::Degraded { step, error } | StepOutcome::Fatal { step, error } => {
                tracing::error!("{} failed, nothing crawled: {}", step, error);
                status.fail(&error);
                output.error = Some(error.to_string());
            }
        }

        output.visited = frontier.into_visited();
        status.finish(output.visited.len());
        tokio::task::yield_now().await;

        tracing::info!(
            "Crawl completed: {} pages, {} CTAs, {} forms in {:?}",
            output.visited.len(),
            output.elements.len(),
            output.forms.len(),
            start_time.elapsed()
        );

        output
    }

    /// Visits pages until the frontier is drained or the budget is used up
    ///
    /// Page errors are logged by the step that hit them and the loop moves
    /// on; only a [`RunAborted`] from the policy table stops it.
    async fn drive(
        &self,
        driver: &mut dyn PageDriver,
        frontier: &mut Frontier,
        output: &mut CrawlOutput,
        status: &StatusPublisher,
    ) -> Result<(), RunAborted> {
        while let Some(queued) = frontier.next() {
            status.visiting(queued.url.as_str(), frontier.visited_count());
            tokio::task::yield_now().await;

            self.visit(driver, &queued, frontier, output).await?;

            status.progress(frontier.visited_count());
            tokio::task::yield_now().await;

            self.follow_links(driver, &queued, frontier, output).await?;
        }
        Ok(())
    }

    /// Loads one page and records its calls-to-action and forms
    async fn visit(
        &self,
        driver: &mut dyn PageDriver,
        queued: &QueuedUrl,
        frontier: &Frontier,
        output: &mut CrawlOutput,
    ) -> Result<(), RunAborted> {
        let page = queued.url.as_str();
        tracing::info!(
            "Crawling {} (depth {}, {}/{})",
            page,
            queued.depth,
            frontier.visited_count(),
            frontier.budget()
        );

        let navigation = driver
            .navigate(page, self.settings.navigation_timeout)
            .await;
        StepOutcome::assess(Step::Navigate, navigation).recover(page)?;

        if let Some(true) =
            StepOutcome::assess(Step::DismissConsent, driver.dismiss_consent().await)
                .recover(page)?
        {
            tracing::debug!("Dismissed consent banner on {}", page);
        }

        let scrolled =
            StepOutcome::assess(Step::Scroll, driver.scroll_to_bottom().await).recover(page)?;
        if scrolled == Some(true) && !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        let elements = StepOutcome::assess(Step::ExtractElements, driver.interactive_elements().await)
            .recover_or_default(page)?;
        let forms =
            StepOutcome::assess(Step::ExtractForms, driver.forms().await).recover_or_default(page)?;

        tracing::debug!(
            "{}: {} CTAs, {} forms",
            page,
            elements.len(),
            forms.len()
        );

        self.record_elements(driver, page, &elements, &mut output.elements)
            .await?;
        self.record_forms(driver, page, &forms, &mut output.forms)
            .await?;

        Ok(())
    }

    async fn record_elements(
        &self,
        driver: &mut dyn PageDriver,
        page: &str,
        elements: &[RawElement],
        records: &mut Vec<ElementRecord>,
    ) -> Result<(), RunAborted> {
        for raw in elements {
            let mut record = ElementRecord::from_raw(page, raw);
            if let Some(clip) = element_clip(&raw.rect) {
                let filename = element_screenshot_name(records.len(), page);
                if let Some(stored) = self
                    .settings
                    .screenshots
                    .capture(driver, page, clip, &filename)
                    .await?
                {
                    record.screenshot_local = Some(stored.local);
                    record.screenshot_url = Some(stored.url);
                }
            }
            records.push(record);
        }
        Ok(())
    }

    async fn record_forms(
        &self,
        driver: &mut dyn PageDriver,
        page: &str,
        forms: &[RawForm],
        records: &mut Vec<FormRecord>,
    ) -> Result<(), RunAborted> {
        for raw in forms {
            let mut record = FormRecord::from_raw(page, raw);
            if let Some(clip) = form_clip(&raw.rect) {
                let filename = form_screenshot_name(records.len(), page);
                if let Some(stored) = self
                    .settings
                    .screenshots
                    .capture(driver, page, clip, &filename)
                    .await?
                {
                    record.form_screenshot_local = Some(stored.local);
                    record.form_screenshot_url = Some(stored.url);
                }
            }
            records.push(record);
        }
        Ok(())
    }

    /// Adds the page's in-scope links to the graph and the frontier
    async fn follow_links(
        &self,
        driver: &mut dyn PageDriver,
        queued: &QueuedUrl,
        frontier: &mut Frontier,
        output: &mut CrawlOutput,
    ) -> Result<(), RunAborted> {
        let page = queued.url.as_str();
        let links =
            StepOutcome::assess(Step::QueryLinks, driver.links().await).recover_or_default(page)?;

        let Some(base) = queued.url.to_url() else {
            tracing::debug!("{} is not a valid base URL, ignoring its links", page);
            return Ok(());
        };

        let mut queued_links = 0;
        for raw in &links {
            let Some(link) = output.scope.canonicalize(&base, raw) else {
                tracing::trace!("Rejected link {} on {}", raw, page);
                continue;
            };
            if frontier.is_visited(&link) {
                continue;
            }

            output.graph.add_edge(queued.url.clone(), link.clone());
            if frontier.offer(link, queued.depth + 1) {
                queued_links += 1;
            }
        }

        tracing::debug!(
            "{}: {} raw links, {} queued, frontier size {}",
            page,
            links.len(),
            queued_links,
            frontier.queued_count()
        );

        Ok(())
    }
}
