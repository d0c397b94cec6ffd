//! Element and form records with their screenshots
//!
//! Records are flat rows keyed by the page they were found on; the export
//! layer writes them as-is. Screenshots are clipped captures of an element's
//! bounding box, stored twice: once in the local screenshot directory and
//! once in the public directory the web front end serves under
//! `/screenshots/`.

use crate::crawler::driver::{BoundingBox, ClipBox, PageDriver, RawElement, RawForm};
use crate::state::{RunAborted, Step, StepOutcome};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Elements must be strictly larger than this on both sides to be captured
pub const ELEMENT_MIN_SIDE: f64 = 6.0;
/// Minimum clip edge for element captures
pub const ELEMENT_CLIP_MIN: u32 = 10;
/// Forms must be strictly larger than this on both sides to be captured
pub const FORM_MIN_SIDE: f64 = 50.0;
/// Minimum clip edge for form captures
pub const FORM_CLIP_MIN: u32 = 50;

const MAX_FILENAME_LEN: usize = 200;

/// A call-to-action found on a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub page_url: String,
    pub page_name: String,
    pub element_type: String,
    pub text: String,
    pub id_or_class: String,
    pub link: Option<String>,
    pub screenshot_local: Option<String>,
    pub screenshot_url: Option<String>,
}

impl ElementRecord {
    pub fn from_raw(page_url: &str, raw: &RawElement) -> Self {
        Self {
            page_url: page_url.to_string(),
            page_name: page_name(page_url),
            element_type: raw.tag.clone(),
            text: raw.text.clone(),
            id_or_class: id_or_class(raw.id.as_deref(), raw.class.as_deref()),
            link: raw.href.clone(),
            screenshot_local: None,
            screenshot_url: None,
        }
    }
}

/// A form found on a page
///
/// `inputs` and `submit_buttons` hold JSON arrays so the record stays flat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub page_url: String,
    pub page_name: String,
    pub form_id_or_class: String,
    pub method: String,
    pub action: Option<String>,
    pub inputs: String,
    pub submit_buttons: String,
    pub form_screenshot_local: Option<String>,
    pub form_screenshot_url: Option<String>,
}

impl FormRecord {
    pub fn from_raw(page_url: &str, raw: &RawForm) -> Self {
        Self {
            page_url: page_url.to_string(),
            page_name: page_name(page_url),
            form_id_or_class: id_or_class(raw.id.as_deref(), raw.class.as_deref()),
            method: raw
                .method
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GET".to_string()),
            action: raw.action.clone(),
            inputs: serde_json::to_string(&raw.inputs).unwrap_or_else(|_| "[]".to_string()),
            submit_buttons: serde_json::to_string(&raw.submit_buttons)
                .unwrap_or_else(|_| "[]".to_string()),
            form_screenshot_local: None,
            form_screenshot_url: None,
        }
    }
}

/// Element id, else its class, else empty
pub fn id_or_class(id: Option<&str>, class: Option<&str>) -> String {
    id.filter(|s| !s.is_empty())
        .or(class.filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}

/// Readable page label: the URL path without surrounding `/`, or `home`
///
/// # Examples
///
/// ```
/// use flowmap::crawler::page_name;
///
/// assert_eq!(page_name("https://example.com/"), "home");
/// assert_eq!(page_name("https://example.com/products/shoes"), "products/shoes");
/// ```
pub fn page_name(page_url: &str) -> String {
    let path = Url::parse(page_url)
        .map(|url| url.path().trim_matches('/').to_string())
        .unwrap_or_default();
    if path.is_empty() {
        "home".to_string()
    } else {
        path
    }
}

/// Makes a string safe to use as a file name
///
/// Every character outside `[A-Za-z0-9-_.]` becomes `_`; the result is capped
/// at 200 characters.
///
/// # Examples
///
/// ```
/// use flowmap::crawler::safe_filename;
///
/// assert_eq!(safe_filename("https://example.com/a?b=c"), "https___example.com_a_b_c");
/// ```
pub fn safe_filename(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect()
}

/// Screenshot file name for the `index`-th element record of a run
pub fn element_screenshot_name(index: usize, page_url: &str) -> String {
    format!("cta_{}_{}.png", index, safe_filename(page_url))
}

/// Screenshot file name for the `index`-th form record of a run
pub fn form_screenshot_name(index: usize, page_url: &str) -> String {
    format!("form_{}_{}.png", index, safe_filename(page_url))
}

/// Returns the clip for an element capture, if the element is large enough
pub fn element_clip(rect: &BoundingBox) -> Option<ClipBox> {
    (rect.width > ELEMENT_MIN_SIDE && rect.height > ELEMENT_MIN_SIDE)
        .then(|| ClipBox::around(rect, ELEMENT_CLIP_MIN))
}

/// Returns the clip for a form capture, if the form is large enough
pub fn form_clip(rect: &BoundingBox) -> Option<ClipBox> {
    (rect.width > FORM_MIN_SIDE && rect.height > FORM_MIN_SIDE)
        .then(|| ClipBox::around(rect, FORM_CLIP_MIN))
}

/// Location of a stored screenshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredScreenshot {
    /// Path in the local screenshot directory
    pub local: String,
    /// URL under which the web front end serves the public copy
    pub url: String,
}

/// Writes screenshots to the local and public directories
#[derive(Debug, Clone)]
pub struct ScreenshotSink {
    local_dir: PathBuf,
    public_dir: PathBuf,
}

impl ScreenshotSink {
    pub fn new(local_dir: impl Into<PathBuf>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            public_dir: public_dir.into(),
        }
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Creates both directories
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.local_dir).await?;
        tokio::fs::create_dir_all(&self.public_dir).await
    }

    /// Writes one PNG to both directories
    pub async fn store(&self, filename: &str, png: &[u8]) -> std::io::Result<StoredScreenshot> {
        let local = self.local_dir.join(filename);
        tokio::fs::write(&local, png).await?;
        tokio::fs::write(self.public_dir.join(filename), png).await?;

        Ok(StoredScreenshot {
            local: local.to_string_lossy().into_owned(),
            url: format!("/screenshots/{}", filename),
        })
    }

    /// Captures a page region and stores it
    ///
    /// A failed capture or write yields `Ok(None)`; only a step the policy
    /// table marks fatal is returned as an error.
    pub async fn capture(
        &self,
        driver: &mut dyn PageDriver,
        page_url: &str,
        clip: ClipBox,
        filename: &str,
    ) -> Result<Option<StoredScreenshot>, RunAborted> {
        let outcome = StepOutcome::assess(Step::Screenshot, driver.screenshot(clip).await);
        let Some(png) = outcome.recover(page_url)? else {
            return Ok(None);
        };

        match self.store(filename, &png).await {
            Ok(stored) => Ok(Some(stored)),
            Err(e) => {
                tracing::warn!("Failed to save screenshot {}: {}", filename, e);
                Ok(None)
            }
        }
    }
}
