#![forbid(unsafe_code)]

//! URL display helpers with a session-scoped parse cache.
//!
//! Sorting by file or domain re-reads every request URL on each comparison,
//! so parsed URLs are memoized. The cache is owned by the request list and
//! cleared with it, never shared process-wide.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use url::Url;

/// The display-relevant parts of a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Decoded file name plus `?query`, or `/` for directory URLs.
    pub name_with_query: String,
    /// `host` or `host:port` when a non-default port is given.
    pub host_port: String,
}

impl UrlParts {
    /// Parse a URL. Unparseable input falls back to the raw string for both
    /// parts so rows still render something.
    pub fn parse(raw: &str) -> Self {
        let Ok(url) = Url::parse(raw) else {
            return Self {
                name_with_query: raw.to_owned(),
                host_port: raw.to_owned(),
            };
        };

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(decode)
            .unwrap_or_default();
        let name = if file_name.is_empty() {
            "/".to_owned()
        } else {
            file_name
        };
        let query = url.query().map(decode).unwrap_or_default();
        let name_with_query = if query.is_empty() {
            name
        } else {
            format!("{name}?{query}")
        };

        let host = url.host_str().unwrap_or_default();
        let host_port = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };

        Self {
            name_with_query,
            host_port,
        }
    }
}

/// Decode `%XX` escapes, leaving malformed escapes untouched.
fn decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Memoized [`UrlParts`] keyed by the raw URL string.
#[derive(Debug, Clone, Default)]
pub struct UrlCache {
    entries: HashMap<String, UrlParts>,
}

impl UrlCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed parts for `raw`, parsing on first use.
    pub fn parts(&mut self, raw: &str) -> &UrlParts {
        self.entries
            .entry(raw.to_owned())
            .or_insert_with(|| UrlParts::parse(raw))
    }

    /// Decoded file name plus query.
    pub fn name_with_query(&mut self, raw: &str) -> String {
        self.parts(raw).name_with_query.clone()
    }

    /// Host and explicit port.
    pub fn host_port(&mut self, raw: &str) -> String {
        self.parts(raw).host_port.clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every parsed URL (session reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_and_query() {
        let parts = UrlParts::parse("https://example.com/static/app.js?v=3");
        assert_eq!(parts.name_with_query, "app.js?v=3");
        assert_eq!(parts.host_port, "example.com");
    }

    #[test]
    fn directory_url_is_slash() {
        let parts = UrlParts::parse("https://example.com/docs/");
        assert_eq!(parts.name_with_query, "/");
        let root = UrlParts::parse("https://example.com");
        assert_eq!(root.name_with_query, "/");
    }

    #[test]
    fn explicit_port_kept() {
        assert_eq!(
            UrlParts::parse("http://localhost:8080/x").host_port,
            "localhost:8080"
        );
        // Default ports are not repeated.
        assert_eq!(UrlParts::parse("https://example.com:443/x").host_port, "example.com");
    }

    #[test]
    fn escapes_are_decoded() {
        let parts = UrlParts::parse("https://example.com/my%20file.png?q=a%2Bb");
        assert_eq!(parts.name_with_query, "my file.png?q=a+b");
    }

    #[test]
    fn malformed_escape_left_alone() {
        assert_eq!(decode("100%"), "100%");
        assert_eq!(decode("%zz1"), "%zz1");
        assert_eq!(decode("%41"), "A");
        assert_eq!(decode("%E2%82%AC"), "\u{20ac}");
        // Invalid UTF-8 after decoding is replaced, not dropped.
        assert_eq!(decode("a%FFb"), "a\u{fffd}b");
    }

    #[test]
    fn multibyte_file_name_decoded() {
        let parts = UrlParts::parse("https://example.com/caf%C3%A9.css");
        assert_eq!(parts.name_with_query, "caf\u{e9}.css");
    }

    #[test]
    fn unparseable_falls_back_to_raw() {
        let parts = UrlParts::parse("not a url");
        assert_eq!(parts.name_with_query, "not a url");
        assert_eq!(parts.host_port, "not a url");
    }

    #[test]
    fn cache_memoizes_and_clears() {
        let mut cache = UrlCache::new();
        assert_eq!(cache.host_port("https://a.test/x"), "a.test");
        assert_eq!(cache.name_with_query("https://a.test/x"), "x");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
