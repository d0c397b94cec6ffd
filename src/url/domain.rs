use url::Url;

/// Extracts the lowercase host from a URL
///
/// Ports are not part of the result.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use flowmap::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the registered crawl domain from a seed URL
///
/// A single leading `www.` label is dropped so `example.com` and
/// `www.example.com` seeds produce the same scope.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use flowmap::url::crawl_domain;
///
/// let url = Url::parse("https://www.example.com/").unwrap();
/// assert_eq!(crawl_domain(&url), Some("example.com".to_string()));
/// ```
pub fn crawl_domain(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => Some(rest.to_string()),
        _ => Some(host),
    }
}
