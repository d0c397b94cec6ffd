/// Checks if a host belongs to the crawl domain
///
/// A host is in scope when it is exactly the crawl domain or any subdomain of
/// it (suffix match on `"." + domain`). An empty domain matches nothing.
///
/// # Examples
///
/// ```
/// use flowmap::url::host_in_scope;
///
/// assert!(host_in_scope("example.com", "example.com"));
/// assert!(host_in_scope("example.com", "www.example.com"));
/// assert!(host_in_scope("example.com", "api.v2.example.com"));
/// assert!(!host_in_scope("example.com", "notexample.com"));
/// assert!(!host_in_scope("example.com", "example.org"));
/// ```
pub fn host_in_scope(domain: &str, host: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
