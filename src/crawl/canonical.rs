// src/crawl/canonical.rs
// =============================================================================
// URL canonicalization: the identity used for deduplication.
//
// Canonical form:
//   scheme://host[:port]/seg1/seg2/.../segN[?query]
//
// - path is split on '/', empty segments are dropped, the rest rejoined
//   (so "//home///" and "/home" are the same page)
// - the query string is kept verbatim
// - the fragment is dropped
// - a non-default port stays with the host, two servers on different
//   ports are different sites
//
// The output is itself a valid absolute URL, which makes canonicalization
// idempotent: feeding the result back in returns the same string.
// =============================================================================

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::error::CrawlError;

/// Normalized string key for a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Canonicalizes an absolute URL string
    pub fn parse(raw: &str) -> Result<Self, CrawlError> {
        let url = Url::parse(raw).map_err(|e| CrawlError::invalid_url(raw, e))?;
        Self::from_url(&url).ok_or_else(|| CrawlError::invalid_url(raw, "URL has no host"))
    }

    fn from_url(url: &Url) -> Option<Self> {
        let host = host_key(url)?;

        let path = url
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        let mut canonical = format!("{}://{}/{}", url.scheme(), host, path);
        if let Some(query) = url.query().filter(|q| !q.is_empty()) {
            canonical.push('?');
            canonical.push_str(query);
        }

        Some(CanonicalUrl(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// host[:port] of this page, see [`host_key`]
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0).ok().as_ref().and_then(host_key)
    }

    /// Parsed form, used as the base when resolving relative links
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

/// Canonicalizes `raw`, failing with `ArgumentMissing` when nothing was supplied
pub fn canonicalize(raw: Option<&str>) -> Result<CanonicalUrl, CrawlError> {
    let raw = raw.ok_or(CrawlError::ArgumentMissing("url"))?;
    CanonicalUrl::parse(raw)
}

/// The "host" used for every same-site decision: host name plus the port
/// when it is not the scheme's default.
///
/// Returns None for URLs without a host (mailto:, data:, ...).
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com", "https://example.com/")]
    #[case("https://example.com/home", "https://example.com/home")]
    #[case("https://example.com/home/", "https://example.com/home")]
    #[case("https://example.com//home///", "https://example.com/home")]
    #[case("https://example.com/a//b/c/", "https://example.com/a/b/c")]
    #[case("https://example.com/home?page=1", "https://example.com/home?page=1")]
    #[case("https://example.com/home?", "https://example.com/home")]
    #[case("https://example.com/home#section", "https://example.com/home")]
    #[case("http://example.com:8080/docs/", "http://example.com:8080/docs")]
    #[case("https://example.com:443/docs", "https://example.com/docs")]
    #[case("HTTPS://Example.COM/Path", "https://example.com/Path")]
    fn test_canonical_form(#[case] raw: &str, #[case] expected: &str) {
        let canonical = CanonicalUrl::parse(raw).unwrap();
        assert_eq!(canonical.as_str(), expected);
    }

    #[test]
    fn test_scheme_is_part_of_the_key() {
        let http = CanonicalUrl::parse("http://example.com/home").unwrap();
        let https = CanonicalUrl::parse("https://example.com/home/").unwrap();
        assert_ne!(http, https);
        assert_eq!(http.as_str().trim_start_matches("http://"), "example.com/home");
        assert_eq!(https.as_str().trim_start_matches("https://"), "example.com/home");
    }

    #[test]
    fn test_duplicate_and_trailing_slashes_are_equal() {
        assert_eq!(
            CanonicalUrl::parse("https://example.com/home").unwrap(),
            CanonicalUrl::parse("https://example.com//home///").unwrap()
        );
    }

    #[rstest]
    #[case("https://example.com")]
    #[case("https://example.com//home///?q=a%20b&x=1#frag")]
    #[case("http://127.0.0.1:9000/a/./b/../c/")]
    #[case("https://example.com/caf%C3%A9/menu")]
    #[case("https://example.com/with space")]
    fn test_idempotent(#[case] raw: &str) {
        let once = CanonicalUrl::parse(raw).unwrap();
        let twice = CanonicalUrl::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_argument() {
        let err = canonicalize(None).unwrap_err();
        assert!(matches!(err, CrawlError::ArgumentMissing("url")));
    }

    #[rstest]
    #[case("")]
    #[case("some text")]
    #[case("/relative/path")]
    #[case("mailto:someone@example.com")]
    fn test_invalid_url(#[case] raw: &str) {
        let err = canonicalize(Some(raw)).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidUrl { .. }), "{:?}", err);
    }

    #[test]
    fn test_host_includes_non_default_port() {
        let canonical = CanonicalUrl::parse("http://localhost:3000/a").unwrap();
        assert_eq!(canonical.host().as_deref(), Some("localhost:3000"));

        let canonical = CanonicalUrl::parse("https://example.com/a").unwrap();
        assert_eq!(canonical.host().as_deref(), Some("example.com"));
    }
}
