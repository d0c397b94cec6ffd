//! Page backend interface
//!
//! The crawl session talks to a rendered page only through [`PageDriver`].
//! Backends produce flat DOM-derived records; the session decides what to
//! keep, how to name screenshots, and what a failure means for the run.

use crate::DriverResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page-relative bounding box in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer clip region handed to [`PageDriver::screenshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ClipBox {
    /// Builds a clip around a bounding box
    ///
    /// Coordinates are clamped to non-negative integers and both dimensions
    /// are raised to at least `min_size`.
    pub fn around(rect: &BoundingBox, min_size: u32) -> Self {
        fn clamp(value: f64) -> u32 {
            if value.is_finite() && value > 0.0 {
                value.min(u32::MAX as f64) as u32
            } else {
                0
            }
        }

        Self {
            x: clamp(rect.x),
            y: clamp(rect.y),
            width: clamp(rect.width).max(min_size),
            height: clamp(rect.height).max(min_size),
        }
    }
}

/// A clickable element as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    /// Lowercase tag name
    pub tag: String,
    /// Trimmed inner text
    pub text: String,
    pub href: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
    pub rect: BoundingBox,
}

/// One field of a form
///
/// Missing attributes are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(rename = "type")]
    pub input_type: String,
    pub name: String,
    pub placeholder: String,
    pub id: String,
    pub class: String,
}

/// A submit control of a form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitButton {
    pub text: String,
    pub id: String,
    pub class: String,
}

/// A form as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForm {
    pub id: Option<String>,
    pub class: Option<String>,
    pub name: Option<String>,
    pub method: Option<String>,
    pub action: Option<String>,
    pub rect: BoundingBox,
    pub inputs: Vec<FormInput>,
    pub submit_buttons: Vec<SubmitButton>,
}

/// Button labels that accept a cookie banner, most specific first
const CONSENT_LABELS: [&str; 3] = ["accept all", "accept cookies", "accept"];

/// Picks the cookie-consent button among the page's buttons
///
/// Takes the inner texts of all buttons in document order and returns the
/// index of the first one whose lowercased text contains any of
/// [`CONSENT_LABELS`].
#[cfg_attr(not(feature = "chromium"), allow(dead_code))]
pub(crate) fn consent_button<S: AsRef<str>>(texts: &[S]) -> Option<usize> {
    texts.iter().position(|text| {
        let text = text.as_ref().to_lowercase();
        CONSENT_LABELS.iter().any(|label| text.contains(label))
    })
}

/// A single page session of a backend
///
/// Every method works on the page most recently passed to
/// [`PageDriver::navigate`].
#[async_trait]
pub trait PageDriver: Send {
    /// Loads a page, failing if it takes longer than `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> DriverResult<()>;

    /// Clicks a cookie-consent acceptor if one is present
    ///
    /// Returns true if something was clicked.
    async fn dismiss_consent(&mut self) -> DriverResult<bool>;

    /// Scrolls to the bottom of the page to trigger lazy content
    ///
    /// Returns false if the backend has nothing to scroll, in which case
    /// there is no lazy content to wait for.
    async fn scroll_to_bottom(&mut self) -> DriverResult<bool>;

    /// Lists the calls-to-action on the page
    async fn interactive_elements(&mut self) -> DriverResult<Vec<RawElement>>;

    /// Lists the forms on the page
    async fn forms(&mut self) -> DriverResult<Vec<RawForm>>;

    /// Lists the raw `href` values of all anchors
    async fn links(&mut self) -> DriverResult<Vec<String>>;

    /// Captures a PNG of the given page region
    async fn screenshot(&mut self, clip: ClipBox) -> DriverResult<Vec<u8>>;

    /// Releases the backend
    async fn close(&mut self) -> DriverResult<()>;
}

/// Factory for page sessions
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> DriverResult<Box<dyn PageDriver>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_clamps_negative_coordinates() {
        let rect = BoundingBox {
            x: -12.5,
            y: -3.0,
            width: 120.7,
            height: 40.2,
        };
        let clip = ClipBox::around(&rect, 10);
        assert_eq!(
            clip,
            ClipBox {
                x: 0,
                y: 0,
                width: 120,
                height: 40
            }
        );
    }

    #[test]
    fn test_clip_applies_minimum_size() {
        let rect = BoundingBox {
            x: 5.0,
            y: 8.0,
            width: 7.0,
            height: 7.0,
        };
        let clip = ClipBox::around(&rect, 10);
        assert_eq!(clip.width, 10);
        assert_eq!(clip.height, 10);

        let clip = ClipBox::around(&rect, 50);
        assert_eq!(clip.width, 50);
        assert_eq!(clip.height, 50);
    }

    #[test]
    fn test_clip_ignores_non_finite_values() {
        let rect = BoundingBox {
            x: f64::NAN,
            y: f64::INFINITY,
            width: 20.0,
            height: 20.0,
        };
        let clip = ClipBox::around(&rect, 10);
        assert_eq!((clip.x, clip.y), (0, 0));
    }

    #[test]
    fn test_consent_button_matches_substring() {
        let texts = ["Menu", "  Accept All Cookies  ", "Reject"];
        assert_eq!(consent_button(&texts), Some(1));

        let texts = ["OK, I ACCEPT"];
        assert_eq!(consent_button(&texts), Some(0));
    }

    #[test]
    fn test_consent_button_first_in_document_order() {
        // a plain "Accept" earlier in the page wins over a later "Accept all"
        let texts = ["Accept", "Accept all"];
        assert_eq!(consent_button(&texts), Some(0));
    }

    #[test]
    fn test_consent_button_none() {
        let texts = ["Sign up", "Decline"];
        assert_eq!(consent_button(&texts), None);
        assert_eq!(consent_button::<&str>(&[]), None);
    }

    #[test]
    fn test_form_input_serializes_type_key() {
        let input = FormInput {
            input_type: "email".to_string(),
            name: "email".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["name"], "email");
        assert_eq!(json["placeholder"], "");
        assert_eq!(json["class"], "");
    }
}
