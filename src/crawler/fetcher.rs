//! HTTP page backend
//!
//! This backend fetches pages with `reqwest` and reads them with `scraper`:
//! - Building the HTTP client with the configured user agent
//! - Bounding each navigation by the configured timeout
//! - Keeping the last response body (even for error statuses) as page state
//!
//! There is no layout engine behind it, so consent dismissal and scrolling
//! are no-ops and screenshots are unsupported.

use crate::config::CrawlerConfig;
use crate::crawler::driver::{ClipBox, DriverLauncher, PageDriver, RawElement, RawForm};
use crate::crawler::parser::{extract_elements, extract_forms, extract_links};
use crate::{DriverError, DriverResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use flowmap::crawler::build_http_client;
///
/// let client = build_http_client("flowmap/0.1").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Launches [`HttpDriver`] sessions
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    user_agent: String,
}

impl HttpLauncher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.user_agent.clone())
    }
}

#[async_trait]
impl DriverLauncher for HttpLauncher {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>> {
        let client =
            build_http_client(&self.user_agent).map_err(|e| DriverError::Launch(e.to_string()))?;
        tracing::debug!("HTTP backend ready (user agent {})", self.user_agent);
        Ok(Box::new(HttpDriver::new(client)))
    }
}

/// The page most recently loaded by [`HttpDriver`]
#[derive(Debug, Clone)]
struct LoadedPage {
    body: String,
}

/// Page session backed by plain HTTP requests
///
/// The body is kept as a string and parsed on every query, since a parsed
/// `scraper::Html` cannot be held across await points.
#[derive(Debug)]
pub struct HttpDriver {
    client: Client,
    page: Option<LoadedPage>,
}

impl HttpDriver {
    pub fn new(client: Client) -> Self {
        Self { client, page: None }
    }

    fn page(&self) -> DriverResult<&LoadedPage> {
        self.page.as_ref().ok_or(DriverError::NoPage)
    }

    async fn fetch(&self, url: &str) -> DriverResult<(LoadedPage, u16)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        if response.url().as_str() != url {
            tracing::debug!("{} redirected to {}", url, response.url());
        }
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok((
            LoadedPage { body },
            status,
        ))
    }
}

/// Maps a transport error onto the page error taxonomy
fn classify(url: &str, error: reqwest::Error) -> DriverError {
    if error.is_timeout() {
        DriverError::Navigation {
            url: url.to_string(),
            message: "request timeout".to_string(),
        }
    } else if error.is_connect() {
        DriverError::Navigation {
            url: url.to_string(),
            message: "connection refused".to_string(),
        }
    } else {
        DriverError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> DriverResult<()> {
        self.page = None;

        let fetched = tokio::time::timeout(timeout, self.fetch(url))
            .await
            .map_err(|_| DriverError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?;
        let (page, status) = fetched?;

        self.page = Some(page);

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(DriverError::Status {
                url: url.to_string(),
                status,
            })
        }
    }

    async fn dismiss_consent(&mut self) -> DriverResult<bool> {
        Ok(false)
    }

    async fn scroll_to_bottom(&mut self) -> DriverResult<bool> {
        Ok(false)
    }

    async fn interactive_elements(&mut self) -> DriverResult<Vec<RawElement>> {
        Ok(extract_elements(&self.page()?.body))
    }

    async fn forms(&mut self) -> DriverResult<Vec<RawForm>> {
        Ok(extract_forms(&self.page()?.body))
    }

    async fn links(&mut self) -> DriverResult<Vec<String>> {
        Ok(extract_links(&self.page()?.body))
    }

    async fn screenshot(&mut self, _clip: ClipBox) -> DriverResult<Vec<u8>> {
        Err(DriverError::Unsupported("screenshot"))
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.page = None;
        Ok(())
    }
}
