//! URL handling module for Flowmap
//!
//! This module turns raw `href` values into canonical, in-scope page keys and
//! derives the crawl scope from a seed URL.

mod canonical;
mod domain;
mod matcher;

pub use canonical::{canonicalize, normalize_seed, CanonicalUrl};
pub use domain::{crawl_domain, extract_domain};
pub use matcher::host_in_scope;

use url::Url;

/// The registered domain a crawl is confined to
///
/// Canonicalization is a pure function of `(scope, base, raw)`: no I/O, no
/// randomness, so equal inputs always produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    domain: String,
}

impl Scope {
    /// Creates a scope for an explicit domain
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
        }
    }

    /// Derives the scope from a seed URL
    ///
    /// The seed is normalized with [`normalize_seed`] first. A seed that still
    /// cannot be parsed produces an empty scope which rejects every link.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowmap::url::Scope;
    ///
    /// assert_eq!(Scope::from_seed("https://www.example.com/").domain(), "example.com");
    /// assert_eq!(Scope::from_seed("example.com").domain(), "example.com");
    /// ```
    pub fn from_seed(seed: &str) -> Self {
        let domain = Url::parse(&normalize_seed(seed))
            .ok()
            .and_then(|url| crawl_domain(&url))
            .unwrap_or_default();
        Self { domain }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns true if the host is the crawl domain or one of its subdomains
    pub fn contains_host(&self, host: &str) -> bool {
        host_in_scope(&self.domain, &host.to_lowercase())
    }

    /// Canonicalizes a raw link found on `base`
    ///
    /// See [`canonicalize`] for the exact rules.
    pub fn canonicalize(&self, base: &Url, raw: &str) -> Option<CanonicalUrl> {
        canonicalize(&self.domain, base, raw)
    }

    /// Canonicalizes a seed against itself
    pub fn canonicalize_seed(&self, seed: &str) -> Option<CanonicalUrl> {
        let seed = normalize_seed(seed);
        let base = Url::parse(&seed).ok()?;
        self.canonicalize(&base, &seed)
    }
}
