//! Pollable crawl status
//!
//! The active run is the only writer; any number of readers (the CLI progress
//! line, the HTTP `/status` endpoint) take snapshots. The cell is a
//! `tokio::sync::watch` channel so readers never observe a half-written record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// Externally visible progress of a crawl run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlStatus {
    /// A run is in progress
    pub running: bool,

    /// The last run has finished (successfully or not)
    pub completed: bool,

    /// Page currently being processed
    pub current_url: Option<String>,

    /// Number of distinct pages visited so far
    pub pages_crawled: usize,

    /// Page budget of the run
    pub total: Option<usize>,

    /// Fatal error that ended the run early
    pub error: Option<String>,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatus {
    /// Fraction of the page budget consumed, if a budget is known
    pub fn progress(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.pages_crawled as f64 / total as f64),
            _ => None,
        }
    }
}

/// Write side of the status cell
#[derive(Debug)]
pub struct StatusPublisher {
    tx: watch::Sender<CrawlStatus>,
}

impl StatusPublisher {
    /// Creates a publisher holding an idle status
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CrawlStatus::default());
        Self { tx }
    }

    /// Creates a new reader handle
    pub fn subscribe(&self) -> StatusReader {
        StatusReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns a copy of the current status
    pub fn snapshot(&self) -> CrawlStatus {
        self.tx.borrow().clone()
    }

    /// Resets the record for a new run with the given page budget
    pub fn begin(&self, total: usize) {
        self.tx.send_replace(CrawlStatus {
            running: true,
            completed: false,
            current_url: None,
            pages_crawled: 0,
            total: Some(total),
            error: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        });
    }

    /// Records the page the run is about to process
    pub fn visiting(&self, url: &str, pages_crawled: usize) {
        self.tx.send_modify(|status| {
            status.current_url = Some(url.to_string());
            status.pages_crawled = pages_crawled;
        });
    }

    /// Records the visited page count
    pub fn progress(&self, pages_crawled: usize) {
        self.tx.send_modify(|status| status.pages_crawled = pages_crawled);
    }

    /// Records the error that ended the run
    pub fn fail(&self, error: impl ToString) {
        let error = error.to_string();
        self.tx.send_modify(|status| status.error = Some(error));
    }

    /// Marks the run finished
    ///
    /// `running` and `completed` flip in the same update, so no reader ever
    /// sees `completed == true` while `running` is still set.
    pub fn finish(&self, pages_crawled: usize) {
        self.tx.send_modify(|status| {
            status.running = false;
            status.completed = true;
            status.current_url = None;
            status.pages_crawled = pages_crawled;
            status.finished_at = Some(Utc::now());
        });
    }
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the status cell
#[derive(Debug, Clone)]
pub struct StatusReader {
    rx: watch::Receiver<CrawlStatus>,
}

impl StatusReader {
    /// Returns a copy of the current status
    pub fn snapshot(&self) -> CrawlStatus {
        self.rx.borrow().clone()
    }

    /// Waits for the next status update
    ///
    /// Returns false once the publisher is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
