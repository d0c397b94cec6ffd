use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Flowmap
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub flows: FlowConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

/// Page backend used to render and inspect pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Plain HTTP fetch with static DOM parsing (no layout, no screenshots)
    #[default]
    Http,
    /// Headless Chromium (requires the `chromium` feature)
    Chromium,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of distinct pages visited in one run
    pub page_budget: usize,

    /// Navigation timeout per page (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Wait after scrolling to the bottom of a page (seconds)
    pub settle_delay_secs: f64,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Which page backend drives navigation
    pub backend: Backend,

    /// User agent sent by the HTTP backend
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_budget: 10,
            navigation_timeout_ms: 30_000,
            settle_delay_secs: 1.0,
            headless: true,
            backend: Backend::Http,
            user_agent: format!("flowmap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.settle_delay_secs.max(0.0))
    }
}

/// Flow enumeration limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FlowConfig {
    /// Maximum number of hops in a single flow
    pub max_depth: usize,

    /// Stop enumerating once this many flows were produced
    pub max_count: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_count: 10_000,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving CSV, JSON and spreadsheet exports
    pub export_dir: PathBuf,

    /// Local copy of every element screenshot
    pub screenshot_dir: PathBuf,

    /// Screenshots served to the front end as `/screenshots/<file>`
    pub public_screenshot_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            screenshot_dir: PathBuf::from("screenshots"),
            public_screenshot_dir: PathBuf::from("public").join("screenshots"),
        }
    }
}

impl OutputConfig {
    /// Path of the zipped public screenshots (`public/screenshots.zip` by default)
    pub fn screenshot_archive_path(&self) -> PathBuf {
        let parent = self
            .public_screenshot_dir
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        parent.join("screenshots.zip")
    }
}

/// HTTP control front end configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address the front end binds to
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
        }
    }
}
