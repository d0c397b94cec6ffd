//! Crawl controller
//!
//! Starts pipeline runs in the background and answers status queries while
//! they run. At most one run is active at a time; the status cell is shared
//! by every run the controller starts.

use crate::config::Config;
use crate::crawler::{launcher_for, DriverLauncher};
use crate::pipeline::{run_pipeline, RunReport};
use crate::state::{CrawlStatus, StatusPublisher, StatusReader};
use crate::ControlError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Owns the status cell and launches runs
#[derive(Clone)]
pub struct CrawlController {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    launcher: Arc<dyn DriverLauncher>,
    status: StatusPublisher,
    running: AtomicBool,
    last_report: Mutex<Option<RunReport>>,
}

impl CrawlController {
    /// Creates a controller using the backend named in the config
    pub fn new(config: Config) -> Self {
        let launcher: Arc<dyn DriverLauncher> = Arc::from(launcher_for(&config.crawler));
        Self::with_launcher(config, launcher)
    }

    pub fn with_launcher(config: Config, launcher: Arc<dyn DriverLauncher>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                launcher,
                status: StatusPublisher::new(),
                running: AtomicBool::new(false),
                last_report: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Starts a run for `seed` on a background task
    ///
    /// Returns as soon as the run is spawned. Fails with
    /// [`ControlError::AlreadyRunning`] while another run is active.
    pub fn start(&self, seed: &str) -> Result<JoinHandle<()>, ControlError> {
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(ControlError::EmptySeed);
        }

        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControlError::AlreadyRunning);
        }

        tracing::info!("Starting run for {}", seed);
        let mut guard = RunGuard {
            inner: Arc::clone(&self.inner),
            finished: false,
        };
        let seed = seed.to_string();
        Ok(tokio::spawn(async move {
            let inner = Arc::clone(&guard.inner);
            let report = run_pipeline(
                &inner.config,
                &seed,
                inner.launcher.as_ref(),
                &inner.status,
            )
            .await;

            if let Ok(mut last) = inner.last_report.lock() {
                *last = Some(report);
            }
            guard.finished = true;
        }))
    }

    /// Whether a run is in progress, including its export pass
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    pub fn status(&self) -> CrawlStatus {
        self.inner.status.snapshot()
    }

    pub fn subscribe(&self) -> StatusReader {
        self.inner.status.subscribe()
    }

    /// Report of the most recent finished run
    pub fn last_report(&self) -> Option<RunReport> {
        self.inner
            .last_report
            .lock()
            .ok()
            .and_then(|last| last.clone())
    }
}

/// Frees the controller when a run task ends, however it ends
///
/// A task that panics is dropped without `finished` set; its status is then
/// closed with an error so readers do not wait forever.
struct RunGuard {
    inner: Arc<Inner>,
    finished: bool,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::error!("Run ended abnormally");
            let status = &self.inner.status;
            let pages = status.snapshot().pages_crawled;
            status.fail("run ended abnormally");
            status.finish(pages);
        }
        self.inner.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::{FailingLauncher, FakePage, FakeSite, PanickingLauncher};

    fn controller(dir: &std::path::Path, launcher: Arc<dyn DriverLauncher>) -> CrawlController {
        let mut config = Config::default();
        config.crawler.settle_delay_secs = 0.0;
        config.output.export_dir = dir.join("exports");
        config.output.screenshot_dir = dir.join("screenshots");
        config.output.public_screenshot_dir = dir.join("public/screenshots");
        CrawlController::with_launcher(config, launcher)
    }

    fn site() -> Arc<dyn DriverLauncher> {
        Arc::new(
            FakeSite::new()
                .page("https://example.com/", FakePage::linking(&["/b"]))
                .page("https://example.com/b", FakePage::default()),
        )
    }

    #[tokio::test]
    async fn test_start_runs_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path(), site());
        assert_eq!(controller.status(), CrawlStatus::default());
        assert!(controller.last_report().is_none());

        let handle = controller.start("https://example.com/").unwrap();
        handle.await.unwrap();

        let status = controller.status();
        assert!(status.completed);
        assert!(!status.running);
        assert_eq!(status.pages_crawled, 2);

        let report = controller.last_report().unwrap();
        assert_eq!(report.pages_crawled, 2);
        assert_eq!(report.flows_generated, 1);
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_rejects_empty_seed() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path(), site());

        assert!(matches!(controller.start("  "), Err(ControlError::EmptySeed)));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_rejects_concurrent_start() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path(), site());

        let handle = controller.start("https://example.com/").unwrap();
        assert!(matches!(
            controller.start("https://example.com/"),
            Err(ControlError::AlreadyRunning)
        ));
        handle.await.unwrap();

        // a finished run frees the controller
        let handle = controller.start("https://example.com/").unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_launch_failure_finishes_run() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path(), Arc::new(FailingLauncher));

        controller.start("https://example.com/").unwrap().await.unwrap();

        let status = controller.status();
        assert!(status.completed);
        assert!(!status.running);
        assert!(status.error.is_some());
        assert_eq!(controller.last_report().unwrap().pages_crawled, 0);
    }

    #[tokio::test]
    async fn test_subscriber_sees_completion() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path(), site());
        let mut reader = controller.subscribe();

        let handle = controller.start("https://example.com/").unwrap();
        while !reader.snapshot().completed {
            if !reader.changed().await {
                break;
            }
        }
        assert!(reader.snapshot().completed);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_run_frees_controller() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path(), Arc::new(PanickingLauncher));

        let result = controller.start("https://example.com/").unwrap().await;
        assert!(result.unwrap_err().is_panic());

        assert!(!controller.is_running());
        let status = controller.status();
        assert!(status.completed);
        assert!(!status.running);
        assert!(status.error.is_some());

        // a later start is accepted rather than refused as already running
        let handle = controller.start("https://example.com/").unwrap();
        assert!(handle.await.unwrap_err().is_panic());
        assert!(!controller.is_running());
    }
}
