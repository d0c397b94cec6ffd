use crate::url::matcher::host_in_scope;
use serde::Serialize;
use std::fmt;
use url::{ParseError, Url};

/// Link prefixes that never point at a crawlable page
const REJECTED_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// A normalized, in-scope page URL used as the dedup and graph key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Wraps a string that did not go through canonicalization.
    ///
    /// Only the crawl seed uses this, when it fails strict validation but the
    /// crawl should still try to visit it.
    pub(crate) fn unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parses the key back into a URL, for use as a resolution base
    pub fn to_url(&self) -> Option<Url> {
        Url::parse(&self.0).ok()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a raw link found on `base` for the given crawl domain
///
/// # Canonicalization Steps
///
/// 1. Trim; reject empty input
/// 2. Reject `mailto:`, `tel:`, `javascript:` (any case) and fragment-only links
/// 3. Resolve against `base`; reject on failure
/// 4. Reject schemes other than http and https
/// 5. Reject hosts outside the crawl domain and its subdomains
/// 6. Drop the fragment and any credentials
/// 7. Collapse repeated `/` in the path
/// 8. Drop a trailing `/` unless the path is the root
/// 9. Serialize scheme, host, port, path and the untouched query
///
/// Returns `None` for every rejected link.
pub fn canonicalize(domain: &str, base: &Url, raw: &str) -> Option<CanonicalUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if raw.starts_with('#')
        || REJECTED_PREFIXES
            .iter()
            .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let mut url = base.join(raw).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let host = url.host_str()?.to_lowercase();
    if !host_in_scope(domain, &host) {
        return None;
    }

    url.set_fragment(None);
    if url.set_username("").is_err() || url.set_password(None).is_err() {
        return None;
    }

    let path = normalize_path(url.path());
    url.set_path(&path);

    Some(CanonicalUrl(url.to_string()))
}

/// Collapses separator runs and drops the trailing separator of non-root paths
fn normalize_path(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for c in path.chars() {
        if c == '/' {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        collapsed.push(c);
    }

    if collapsed.is_empty() {
        return "/".to_string();
    }

    if collapsed.len() > 1 && collapsed.ends_with('/') {
        collapsed.pop();
    }

    collapsed
}

/// Brings a user-supplied seed into absolute form
///
/// Seeds without a scheme are assumed to be bare hosts and get an `https://`
/// prefix. A `host:port` seed counts as schemeless. Seeds that carry any other
/// scheme are kept as given, so `ftp:` or `mailto:` seeds fail
/// canonicalization instead of turning into a made-up host.
///
/// # Examples
///
/// ```
/// use flowmap::url::normalize_seed;
///
/// assert_eq!(normalize_seed("example.com"), "https://example.com");
/// assert_eq!(normalize_seed(" http://example.com/ "), "http://example.com/");
/// assert_eq!(normalize_seed("ftp://example.com/"), "ftp://example.com/");
/// ```
pub fn normalize_seed(raw: &str) -> String {
    let raw = raw.trim();
    if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

/// Returns whether `raw` starts with a scheme of its own
fn has_scheme(raw: &str) -> bool {
    match Url::parse(raw) {
        // `example.com:8080` parses with `example.com` as its scheme
        Ok(_) => raw
            .split_once(':')
            .is_some_and(|(_, rest)| !rest.starts_with(|c: char| c.is_ascii_digit())),
        Err(ParseError::RelativeUrlWithoutBase) => false,
        Err(_) => true,
    }
}
