//! Shared fixtures for export tests

use crate::crawler::{CrawlGraph, CrawlOutput, ElementRecord, FormRecord};
use crate::flows::Flow;
use crate::url::{CanonicalUrl, Scope};

fn key(path: &str) -> CanonicalUrl {
    CanonicalUrl::unchecked(format!("https://example.com{}", path))
}

pub fn sample_crawl() -> CrawlOutput {
    let mut graph = CrawlGraph::new();
    graph.add_edge(key("/"), key("/pricing"));
    graph.add_edge(key("/"), key("/contact"));
    graph.add_edge(key("/pricing"), key("/contact"));

    CrawlOutput {
        seed: key("/"),
        scope: Scope::new("example.com"),
        graph,
        visited: vec![key("/"), key("/pricing"), key("/contact")],
        elements: vec![
            ElementRecord {
                page_url: "https://example.com/".to_string(),
                page_name: "home".to_string(),
                element_type: "a".to_string(),
                text: "Start trial".to_string(),
                id_or_class: "hero".to_string(),
                link: Some("https://example.com/pricing".to_string()),
                screenshot_local: Some("screenshots/cta_0_https___example.com_.png".to_string()),
                screenshot_url: Some("/screenshots/cta_0_https___example.com_.png".to_string()),
            },
            ElementRecord {
                page_url: "https://example.com/pricing".to_string(),
                page_name: "pricing".to_string(),
                element_type: "button".to_string(),
                text: "Buy, now".to_string(),
                id_or_class: "btn primary".to_string(),
                link: None,
                screenshot_local: None,
                screenshot_url: None,
            },
        ],
        forms: vec![FormRecord {
            page_url: "https://example.com/contact".to_string(),
            page_name: "contact".to_string(),
            form_id_or_class: "contact-form".to_string(),
            method: "post".to_string(),
            action: Some("https://example.com/send".to_string()),
            inputs: r#"[{"type":"email","name":"email","placeholder":"","id":"","class":""}]"#
                .to_string(),
            submit_buttons: r#"[{"text":"Send","id":"","class":""}]"#.to_string(),
            form_screenshot_local: None,
            form_screenshot_url: None,
        }],
        error: None,
    }
}

pub fn sample_flows() -> Vec<Flow> {
    vec![
        Flow::new(vec![key("/"), key("/contact")]),
        Flow::new(vec![key("/"), key("/pricing"), key("/contact")]),
    ]
}
