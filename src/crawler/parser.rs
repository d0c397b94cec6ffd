//! HTML extraction for the HTTP backend
//!
//! This module reads the records a [`PageDriver`](super::PageDriver) reports
//! straight from markup:
//! - Calls-to-action (anchors, buttons, button-like inputs)
//! - Forms with their fields and submit controls
//! - Raw anchor `href` values
//!
//! Markup carries no layout, so every bounding box is zero.

use crate::crawler::driver::{FormInput, RawElement, RawForm, SubmitButton};
use scraper::{ElementRef, Html, Selector};

const ELEMENT_SELECTOR: &str =
    "a, button, [role='button'], input[type='submit'], input[type='button']";
const FORM_FIELD_SELECTOR: &str = "input, select, textarea";
const SUBMIT_SELECTOR: &str = "button[type='submit'], input[type='submit']";

/// Everything the HTTP backend extracts from one document
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub elements: Vec<RawElement>,
    pub forms: Vec<RawForm>,
    pub links: Vec<String>,
}

/// Parses an HTML document and extracts all page records
///
/// Element links and form actions keep the attribute value as written.
///
/// # Example
///
/// ```
/// use flowmap::crawler::parse_html;
///
/// let html = r#"<html><body><a href="/pricing">See pricing</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.links, vec!["/pricing".to_string()]);
/// assert_eq!(parsed.elements[0].href.as_deref(), Some("/pricing"));
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        elements: elements_in(&document),
        forms: forms_in(&document),
        links: links_in(&document),
    }
}

/// Extracts calls-to-action from an HTML document
pub fn extract_elements(html: &str) -> Vec<RawElement> {
    elements_in(&Html::parse_document(html))
}

/// Extracts forms from an HTML document
pub fn extract_forms(html: &str) -> Vec<RawForm> {
    forms_in(&Html::parse_document(html))
}

/// Extracts the raw `href` of every anchor that has one
pub fn extract_links(html: &str) -> Vec<String> {
    links_in(&Html::parse_document(html))
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}

fn elements_in(document: &Html) -> Vec<RawElement> {
    let Some(selector) = selector(ELEMENT_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| {
            let tag = element.value().name().to_ascii_lowercase();
            let mut text = inner_text(&element);
            if text.is_empty() && tag == "input" {
                text = attr(&element, "value").unwrap_or_default();
            }

            RawElement {
                tag,
                text,
                href: raw_attr(&element, "href"),
                id: attr(&element, "id"),
                class: attr(&element, "class"),
                rect: Default::default(),
            }
        })
        .collect()
}

fn forms_in(document: &Html) -> Vec<RawForm> {
    let (Some(form_selector), Some(field_selector), Some(submit_selector)) = (
        selector("form"),
        selector(FORM_FIELD_SELECTOR),
        selector(SUBMIT_SELECTOR),
    ) else {
        return Vec::new();
    };

    document
        .select(&form_selector)
        .map(|form| RawForm {
            id: attr(&form, "id"),
            class: attr(&form, "class"),
            name: attr(&form, "name"),
            method: attr(&form, "method"),
            action: raw_attr(&form, "action"),
            rect: Default::default(),
            inputs: form.select(&field_selector).map(form_input).collect(),
            submit_buttons: form
                .select(&submit_selector)
                .map(|button| {
                    let text = inner_text(&button);
                    SubmitButton {
                        text: if text.is_empty() {
                            attr(&button, "value").unwrap_or_default()
                        } else {
                            text
                        },
                        id: attr(&button, "id").unwrap_or_default(),
                        class: attr(&button, "class").unwrap_or_default(),
                    }
                })
                .collect(),
        })
        .collect()
}

fn links_in(document: &Html) -> Vec<String> {
    let Some(selector) = selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Mirrors the DOM `type` property of form controls
fn form_input(field: ElementRef<'_>) -> FormInput {
    let input_type = match field.value().name() {
        "select" if field.value().attr("multiple").is_some() => "select-multiple".to_string(),
        "select" => "select-one".to_string(),
        "textarea" => "textarea".to_string(),
        _ => attr(&field, "type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string()),
    };

    FormInput {
        input_type,
        name: attr(&field, "name").unwrap_or_default(),
        placeholder: attr(&field, "placeholder").unwrap_or_default(),
        id: attr(&field, "id").unwrap_or_default(),
        class: attr(&field, "class").unwrap_or_default(),
    }
}

/// Non-empty attribute value
fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Text content with whitespace runs collapsed
fn inner_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attribute value as written, if present and not empty
fn raw_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
