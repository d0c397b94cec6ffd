//! Crawl frontier under a page budget
//!
//! This module handles:
//! - The FIFO queue of pages awaiting a visit, with their hop depth
//! - The visited set, kept in visitation order
//! - Budget admission at enqueue and dequeue time

use crate::url::CanonicalUrl;
use indexmap::IndexSet;
use std::collections::VecDeque;

/// A page queued for a visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The page to visit
    pub url: CanonicalUrl,

    /// Number of hops from the seed
    pub depth: usize,
}

/// Frontier manages the visit queue and the visited set of one run
///
/// Admission is checked twice:
/// - at enqueue, `visited + queued < budget` (inexact: the queue may hold
///   duplicates, so fewer distinct pages than the budget may get admitted)
/// - at dequeue, `visited < budget`, which is the hard cap on visited pages
#[derive(Debug, Clone)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
    visited: IndexSet<CanonicalUrl>,
    budget: usize,
}

impl Frontier {
    /// Creates an empty frontier for the given page budget
    pub fn new(budget: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: IndexSet::new(),
            budget,
        }
    }

    /// Queues the crawl seed at depth 0, bypassing admission
    pub fn push_seed(&mut self, seed: CanonicalUrl) {
        self.queue.push_back(QueuedUrl {
            url: seed,
            depth: 0,
        });
    }

    /// Gets the next page to visit and marks it visited
    ///
    /// Entries already visited are skipped. Returns `None` once the queue is
    /// drained or the budget is used up.
    pub fn next(&mut self) -> Option<QueuedUrl> {
        while self.visited.len() < self.budget {
            let queued = self.queue.pop_front()?;
            if self.visited.contains(&queued.url) {
                tracing::trace!("Skipping already visited {}", queued.url);
                continue;
            }
            self.visited.insert(queued.url.clone());
            return Some(queued);
        }
        None
    }

    /// Offers a discovered page to the queue
    ///
    /// Returns true if the page was queued.
    pub fn offer(&mut self, url: CanonicalUrl, depth: usize) -> bool {
        if self.visited.contains(&url) || self.visited.len() + self.queue.len() >= self.budget {
            return false;
        }
        self.queue.push_back(QueuedUrl { url, depth });
        true
    }

    /// Returns whether the page has been visited in this run
    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    /// Returns the number of pages visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns the number of queued entries, duplicates included
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Consumes the frontier, returning visited pages in visitation order
    pub fn into_visited(self) -> Vec<CanonicalUrl> {
        self.visited.into_iter().collect()
    }
}
