//! In-memory page backend for crawl tests

use crate::crawler::driver::{ClipBox, DriverLauncher, PageDriver, RawElement, RawForm};
use crate::{DriverError, DriverResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub links: Vec<String>,
    pub elements: Vec<RawElement>,
    pub forms: Vec<RawForm>,
    pub broken_extraction: bool,
    pub broken_consent: bool,
    pub broken_scroll: bool,
    pub broken_links: bool,
}

impl FakePage {
    pub fn linking(links: &[&str]) -> Self {
        Self {
            links: links.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// A site keyed by exact URL; unknown URLs answer 404 with an empty page
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    navigations: Arc<Mutex<Vec<String>>>,
    scrolls: Arc<Mutex<usize>>,
    screenshots_fail: bool,
    scrollable: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn failing_screenshots(mut self) -> Self {
        self.screenshots_fail = true;
        self
    }

    /// Makes `scroll_to_bottom` report an actual scroll
    pub fn scrollable(mut self) -> Self {
        self.scrollable = true;
        self
    }

    /// Number of successful scrolls so far
    pub fn scrolls(&self) -> usize {
        *self.scrolls.lock().unwrap()
    }

    /// URLs navigated to so far, in order
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[async_trait]
impl DriverLauncher for FakeSite {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>> {
        Ok(Box::new(FakeDriver {
            site: self.clone(),
            current: None,
        }))
    }
}

pub struct FakeDriver {
    site: FakeSite,
    current: Option<FakePage>,
}

impl FakeDriver {
    fn current(&self) -> DriverResult<&FakePage> {
        self.current.as_ref().ok_or(DriverError::NoPage)
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> DriverResult<()> {
        self.site.navigations.lock().unwrap().push(url.to_string());
        match self.site.pages.get(url) {
            Some(page) => {
                self.current = Some(page.clone());
                Ok(())
            }
            None => {
                self.current = Some(FakePage::default());
                Err(DriverError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
        }
    }

    async fn dismiss_consent(&mut self) -> DriverResult<bool> {
        if self.current()?.broken_consent {
            return Err(DriverError::Script("consent handler crashed".to_string()));
        }
        Ok(false)
    }

    async fn scroll_to_bottom(&mut self) -> DriverResult<bool> {
        if self.current()?.broken_scroll {
            return Err(DriverError::Script("scroll failed".to_string()));
        }
        *self.site.scrolls.lock().unwrap() += 1;
        Ok(self.site.scrollable)
    }

    async fn interactive_elements(&mut self) -> DriverResult<Vec<RawElement>> {
        let page = self.current()?;
        if page.broken_extraction {
            return Err(DriverError::Script("extractor crashed".to_string()));
        }
        Ok(page.elements.clone())
    }

    async fn forms(&mut self) -> DriverResult<Vec<RawForm>> {
        let page = self.current()?;
        if page.broken_extraction {
            return Err(DriverError::Script("extractor crashed".to_string()));
        }
        Ok(page.forms.clone())
    }

    async fn links(&mut self) -> DriverResult<Vec<String>> {
        let page = self.current()?;
        if page.broken_links {
            return Err(DriverError::Script("link query failed".to_string()));
        }
        Ok(page.links.clone())
    }

    async fn screenshot(&mut self, _clip: ClipBox) -> DriverResult<Vec<u8>> {
        if self.site.screenshots_fail {
            Err(DriverError::Screenshot("capture failed".to_string()))
        } else {
            Ok(FAKE_PNG.to_vec())
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}

/// Launcher whose backend never starts
pub struct FailingLauncher;

#[async_trait]
impl DriverLauncher for FailingLauncher {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>> {
        Err(DriverError::Launch("browser binary not found".to_string()))
    }
}

/// Launcher that panics instead of returning
pub struct PanickingLauncher;

#[async_trait]
impl DriverLauncher for PanickingLauncher {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>> {
        panic!("backend crashed while starting");
    }
}
