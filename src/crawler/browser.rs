//! Headless Chromium page backend
//!
//! Drives a real browser through the DevTools protocol, so extraction sees
//! the rendered DOM with layout and screenshots are available. Enabled with
//! the `chromium` cargo feature.

use crate::config::CrawlerConfig;
use crate::crawler::driver::{
    consent_button, ClipBox, DriverLauncher, PageDriver, RawElement, RawForm,
};
use crate::{DriverError, DriverResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Time for the page to react after a consent banner is clicked
const CONSENT_SETTLE: Duration = Duration::from_millis(800);

const ONETRUST_SCRIPT: &str = r#"(() => {
  const onetrust = document.querySelector('#onetrust-accept-btn-handler');
  if (onetrust) { onetrust.click(); return true; }
  return false;
})()"#;

const BUTTON_TEXTS_SCRIPT: &str = r#"(() =>
  Array.from(document.querySelectorAll('button')).map(b => b.innerText || '')
)()"#;

fn click_button_script(index: usize) -> String {
    format!(
        "(() => {{ const b = document.querySelectorAll('button')[{}]; if (b) {{ b.click(); return true; }} return false; }})()",
        index
    )
}

const SCROLL_SCRIPT: &str = r#"(() => {
  window.scrollTo(0, document.body ? document.body.scrollHeight : 0);
  return true;
})()"#;

const ELEMENTS_SCRIPT: &str = r#"(() => {
  const rectOf = el => {
    const r = el.getBoundingClientRect();
    return { x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height };
  };
  const str = v => (typeof v === 'string' && v.trim()) ? v.trim() : null;
  const sel = "a, button, [role='button'], input[type='submit'], input[type='button']";
  return Array.from(document.querySelectorAll(sel)).map(el => ({
    tag: el.tagName.toLowerCase(),
    text: (el.innerText || el.value || '').trim(),
    href: el.getAttribute('href') || null,
    id: str(el.id),
    class: str(el.className),
    rect: rectOf(el),
  }));
})()"#;

const FORMS_SCRIPT: &str = r#"(() => {
  const rectOf = el => {
    const r = el.getBoundingClientRect();
    return { x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height };
  };
  const str = v => (typeof v === 'string' && v.trim()) ? v.trim() : null;
  const attr = (el, name) => el.getAttribute(name) || '';
  return Array.from(document.querySelectorAll('form')).map(form => ({
    id: str(form.id),
    class: str(form.className),
    name: str(form.getAttribute('name')),
    method: str(form.getAttribute('method')),
    action: form.getAttribute('action') || null,
    rect: rectOf(form),
    inputs: Array.from(form.querySelectorAll('input, select, textarea')).map(i => ({
      type: i.type || 'text',
      name: attr(i, 'name'),
      placeholder: attr(i, 'placeholder'),
      id: attr(i, 'id'),
      class: attr(i, 'class'),
    })),
    submit_buttons: Array.from(form.querySelectorAll("button[type='submit'], input[type='submit']")).map(b => ({
      text: (b.innerText || b.value || '').trim(),
      id: attr(b, 'id'),
      class: attr(b, 'class'),
    })),
  }));
})()"#;

const LINKS_SCRIPT: &str = r#"(() =>
  Array.from(document.querySelectorAll('a[href]')).map(a => a.getAttribute('href'))
)()"#;

/// Launches [`ChromiumDriver`] sessions
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
}

impl ChromiumLauncher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.headless)
    }
}

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        tracing::info!(
            "Chromium backend ready ({})",
            if self.headless { "headless" } else { "headful" }
        );

        Ok(Box::new(ChromiumDriver {
            browser,
            page,
            handler,
        }))
    }
}

/// Page session backed by one Chromium tab
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    async fn eval<T: DeserializeOwned>(&self, script: &str) -> DriverResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| DriverError::Script(e.to_string()))
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> DriverResult<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(DriverError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn dismiss_consent(&mut self) -> DriverResult<bool> {
        let mut clicked: bool = self.eval(ONETRUST_SCRIPT).await?;
        if !clicked {
            let texts: Vec<String> = self.eval(BUTTON_TEXTS_SCRIPT).await?;
            if let Some(index) = consent_button(&texts) {
                clicked = self.eval(&click_button_script(index)).await?;
            }
        }
        if clicked {
            tokio::time::sleep(CONSENT_SETTLE).await;
        }
        Ok(clicked)
    }

    async fn scroll_to_bottom(&mut self) -> DriverResult<bool> {
        self.eval(SCROLL_SCRIPT).await
    }

    async fn interactive_elements(&mut self) -> DriverResult<Vec<RawElement>> {
        self.eval(ELEMENTS_SCRIPT).await
    }

    async fn forms(&mut self) -> DriverResult<Vec<RawForm>> {
        self.eval(FORMS_SCRIPT).await
    }

    async fn links(&mut self) -> DriverResult<Vec<String>> {
        self.eval(LINKS_SCRIPT).await
    }

    async fn screenshot(&mut self, clip: ClipBox) -> DriverResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(Viewport {
                x: clip.x as f64,
                y: clip.y as f64,
                width: clip.width as f64,
                height: clip.height as f64,
                scale: 1.0,
            })
            .build();

        self.page
            .screenshot(params)
            .await
            .map_err(|e| DriverError::Screenshot(e.to_string()))
    }

    async fn close(&mut self) -> DriverResult<()> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Script(e.to_string()));
        let _ = self.browser.wait().await;
        self.handler.abort();
        result
    }
}
