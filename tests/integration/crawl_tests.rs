//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site and drive the HTTP backend
//! through the full pipeline: crawl, flow enumeration and exports.

use flowmap::config::Config;
use flowmap::crawler::HttpLauncher;
use flowmap::pipeline::run_pipeline_with_output;
use flowmap::{CanonicalUrl, StatusPublisher};
use std::collections::HashSet;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing everything below `dir`
fn create_test_config(dir: &Path, page_budget: usize) -> Config {
    let mut config = Config::default();
    config.crawler.page_budget = page_budget;
    config.crawler.settle_delay_secs = 0.0;
    config.crawler.navigation_timeout_ms = 5_000;
    config.crawler.user_agent = "flowmap-test/1.0".to_string();
    config.output.export_dir = dir.join("exports");
    config.output.screenshot_dir = dir.join("screenshots");
    config.output.public_screenshot_dir = dir.join("public/screenshots");
    config
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// `/` links to `/b` and `/c`; `/b` links to `/c`; `/c` holds a form
async fn three_page_site() -> MockServer {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a id="to-b" href="/b">Page B</a>
        <a class="nav link" href="/c/">Page C</a>
        <a href="mailto:team@example.com">Mail us</a>
        <a href="https://elsewhere.org/">Partner</a>
        </body></html>"#,
    )
    .await;

    mount_page(
        &server,
        "/b",
        r#"<html><body><a href="/c#top">Continue</a></body></html>"#,
    )
    .await;

    mount_page(
        &server,
        "/c",
        r#"<html><body>
        <form id="signup" method="post" action="/subscribe">
            <input type="email" name="email" placeholder="you@example.com">
            <button type="submit">Subscribe</button>
        </form>
        </body></html>"#,
    )
    .await;

    server
}

fn key(base: &str, route: &str) -> CanonicalUrl {
    let raw = format!("{}{}", base, route);
    flowmap::Scope::from_seed(base)
        .canonicalize_seed(&raw)
        .expect("test URL should canonicalize")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = three_page_site().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), 10);
    let launcher = HttpLauncher::from_config(&config.crawler);
    let status = StatusPublisher::new();

    let (output, report) = run_pipeline_with_output(&config, &base, &launcher, &status).await;
    let crawl = &output.crawl;

    // Visited pages, in breadth-first order
    assert_eq!(
        crawl.visited,
        vec![key(&base, "/"), key(&base, "/b"), key(&base, "/c")]
    );

    // Graph: / -> {b, c}, b -> {c}; mailto and off-domain links dropped
    let home: HashSet<_> = crawl
        .graph
        .neighbors(&key(&base, "/"))
        .unwrap()
        .iter()
        .cloned()
        .collect();
    assert_eq!(home, HashSet::from([key(&base, "/b"), key(&base, "/c")]));
    assert_eq!(
        crawl.graph.sorted_neighbors(&key(&base, "/b")),
        vec![&key(&base, "/c")]
    );
    assert!(!crawl.graph.has_edges(&key(&base, "/c")));

    // Flows
    let flows: Vec<Vec<CanonicalUrl>> = output.flows.iter().map(|f| f.pages().to_vec()).collect();
    assert!(flows.contains(&vec![key(&base, "/"), key(&base, "/c")]));
    assert!(flows.contains(&vec![key(&base, "/"), key(&base, "/b"), key(&base, "/c")]));
    assert_eq!(flows.len(), 2);

    // Records
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.forms_found, 1);
    assert!(report.ctas_found >= 3);
    assert_eq!(report.error, None);

    let form = &crawl.forms[0];
    assert_eq!(form.form_id_or_class, "signup");
    assert_eq!(form.method, "post");
    assert!(form.inputs.contains("email"));
    assert!(form.submit_buttons.contains("Subscribe"));

    // HTTP backend takes no screenshots
    assert!(crawl.elements.iter().all(|e| e.screenshot_url.is_none()));
    assert!(report.artifact("screenshots.zip").is_none());

    // Status is finalized
    let snapshot = status.snapshot();
    assert!(snapshot.completed);
    assert!(!snapshot.running);
    assert_eq!(snapshot.pages_crawled, 3);
}

#[tokio::test]
async fn test_exports_written_with_headers() {
    let server = three_page_site().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), 10);
    let launcher = HttpLauncher::from_config(&config.crawler);
    let status = StatusPublisher::new();

    run_pipeline_with_output(&config, &base, &launcher, &status).await;

    let exports = dir.path().join("exports");
    let cta_csv = std::fs::read_to_string(exports.join("cta_tracking_map.csv")).unwrap();
    assert!(cta_csv.starts_with(
        "page_url,page_name,element_type,text,id_or_class,link,screenshot_local,screenshot_url"
    ));
    assert!(cta_csv.contains("Page B"));

    let form_csv = std::fs::read_to_string(exports.join("form_tracking_map.csv")).unwrap();
    assert!(form_csv.starts_with("page_url,page_name,form_id_or_class,method,action"));
    assert!(form_csv.contains("signup"));

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(exports.join("cta_form_tracking_map.json")).unwrap(),
    )
    .unwrap();
    assert!(json["ctas"].as_array().unwrap().len() >= 3);
    assert_eq!(json["forms"].as_array().unwrap().len(), 1);

    for name in ["cta_sdr_export.xlsx", "user_flows.xlsx", "crawl_summary.md"] {
        assert!(exports.join(name).is_file(), "{} missing", name);
    }

    let summary = std::fs::read_to_string(exports.join("crawl_summary.md")).unwrap();
    assert!(summary.contains("- **Pages Crawled**: 3"));
    assert!(summary.contains("- **Flows Generated**: 2"));
}

#[tokio::test]
async fn test_page_budget_limits_visits() {
    let server = MockServer::start().await;
    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links)).await;

    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), 1);
    let launcher = HttpLauncher::from_config(&config.crawler);
    let status = StatusPublisher::new();

    let (output, report) = run_pipeline_with_output(&config, &base, &launcher, &status).await;

    assert_eq!(report.pages_crawled, 1);
    assert_eq!(output.crawl.graph.edge_count(), 5);

    // only the seed was ever requested
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_missing_pages_are_still_visited() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/gone">Gone</a><a href="/ok">Ok</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/ok", "<html><body>fine</body></html>").await;
    // /gone falls through to wiremock's 404

    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), 10);
    let launcher = HttpLauncher::from_config(&config.crawler);
    let status = StatusPublisher::new();

    let (output, report) = run_pipeline_with_output(&config, &base, &launcher, &status).await;

    assert_eq!(report.pages_crawled, 3);
    assert!(output.crawl.visited.contains(&key(&base, "/gone")));
    assert_eq!(report.error, None);
}

#[tokio::test]
async fn test_cycle_produces_single_flow() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/">Home</a>"#).await;

    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path(), 10);
    config.flows.max_depth = 3;
    let launcher = HttpLauncher::from_config(&config.crawler);
    let status = StatusPublisher::new();

    let (output, _) = run_pipeline_with_output(&config, &base, &launcher, &status).await;

    assert_eq!(output.crawl.visited.len(), 2);
    assert_eq!(output.flows.len(), 1);
    assert_eq!(
        output.flows[0].pages(),
        &[key(&base, "/"), key(&base, "/b")]
    );
}
