use crate::url::CanonicalUrl;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Directed link graph discovered by a crawl
///
/// Keys are visited pages in visitation order; values are the in-scope pages
/// each one links to. A page only becomes a key once its first edge is
/// recorded, and edge targets need not be keys themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrawlGraph {
    edges: IndexMap<CanonicalUrl, HashSet<CanonicalUrl>>,
}

impl CrawlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a link from `from` to `to`
    ///
    /// Returns true if the edge was new.
    pub fn add_edge(&mut self, from: CanonicalUrl, to: CanonicalUrl) -> bool {
        self.edges.entry(from).or_default().insert(to)
    }

    /// Outbound links of a page, if it has any
    pub fn neighbors(&self, page: &CanonicalUrl) -> Option<&HashSet<CanonicalUrl>> {
        self.edges.get(page)
    }

    /// Outbound links of a page in lexicographic order
    pub fn sorted_neighbors(&self, page: &CanonicalUrl) -> Vec<&CanonicalUrl> {
        let mut neighbors: Vec<&CanonicalUrl> = self
            .edges
            .get(page)
            .map(|targets| targets.iter().collect())
            .unwrap_or_default();
        neighbors.sort();
        neighbors
    }

    /// Returns whether the page has any recorded outbound link
    pub fn has_edges(&self, page: &CanonicalUrl) -> bool {
        self.edges.get(page).is_some_and(|targets| !targets.is_empty())
    }

    /// Pages with outbound links, in visitation order
    pub fn pages(&self) -> impl Iterator<Item = &CanonicalUrl> {
        self.edges.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalUrl, &HashSet<CanonicalUrl>)> {
        self.edges.iter()
    }

    /// Number of pages with outbound links
    pub fn page_count(&self) -> usize {
        self.edges.len()
    }

    /// Total number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
