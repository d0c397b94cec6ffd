//! User flow enumeration
//!
//! A flow is one cycle-free walk through the crawl graph starting at the
//! seed. Flows end when the depth bound is reached or the walk cannot go on.

mod enumerate;

pub use enumerate::enumerate_flows;

use crate::config::FlowConfig;
use crate::url::CanonicalUrl;
use serde::Serialize;
use std::fmt;

/// Separator between pages when a flow is rendered as text
pub const FLOW_SEPARATOR: &str = " → ";

/// Bounds on flow enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLimits {
    /// Maximum number of hops in one flow
    pub max_depth: usize,

    /// Maximum number of flows returned
    pub max_flows: usize,
}

impl FlowLimits {
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_flows: config.max_count,
        }
    }

    /// Expansion steps allowed before enumeration gives up
    pub fn expansion_cap(&self) -> usize {
        self.max_flows.saturating_mul(10)
    }
}

impl Default for FlowLimits {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

/// One navigation path through the crawl graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Flow(Vec<CanonicalUrl>);

impl Flow {
    pub fn new(pages: Vec<CanonicalUrl>) -> Self {
        Self(pages)
    }

    pub fn pages(&self) -> &[CanonicalUrl] {
        &self.0
    }

    /// Number of pages in the flow
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of links followed
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, page) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(FLOW_SEPARATOR)?;
            }
            f.write_str(page.as_str())?;
        }
        Ok(())
    }
}
