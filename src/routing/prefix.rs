//! Mount prefix handling.
//!
//! # Design Decisions
//! - Prefix matching is a constant string comparison at a segment boundary
//!   (`/proxy` matches `/proxy` and `/proxy/x`, never `/proxyx`)
//! - Applying the prefix is idempotent: a URL already carrying it is
//!   returned unchanged
//! - An empty prefix means the proxy is mounted at `/`; every operation is
//!   then the identity

use std::borrow::Cow;

/// The path segment under which the proxy itself is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountPrefix(String);

impl MountPrefix {
    /// Create a prefix. Trailing slashes are dropped.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self(prefix.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the proxy is mounted at `/`.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Strip one leading occurrence of the prefix from `path`.
    ///
    /// Returns `None` when the path does not start with the prefix. The
    /// remainder may be empty (for a path equal to the prefix).
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.is_applied(path) {
            Some(&path[self.0.len()..])
        } else {
            None
        }
    }

    /// True when `url` already starts with the prefix at a boundary.
    pub fn is_applied(&self, url: &str) -> bool {
        if self.is_root() {
            return false;
        }
        match url.strip_prefix(self.0.as_str()) {
            Some(rest) => matches!(rest.as_bytes().first(), None | Some(b'/' | b'?' | b'#')),
            None => false,
        }
    }

    /// Prepend the prefix to a root-relative URL.
    ///
    /// Protocol-relative (`//host`), absolute and document-relative URLs, and
    /// URLs already carrying the prefix, are returned unchanged.
    pub fn apply<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if self.is_root() || !is_root_relative(url) || self.is_applied(url) {
            Cow::Borrowed(url)
        } else {
            Cow::Owned(format!("{}{}", self.0, url))
        }
    }
}

impl std::fmt::Display for MountPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A URL beginning with a single `/`.
pub fn is_root_relative(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_at_segment_boundary() {
        let prefix = MountPrefix::new("/proxy");
        assert_eq!(prefix.strip("/proxy/products"), Some("/products"));
        assert_eq!(prefix.strip("/proxy"), Some(""));
        assert_eq!(prefix.strip("/proxyfoo"), None);
        assert_eq!(prefix.strip("/products"), None);
    }

    #[test]
    fn test_strip_only_once() {
        let prefix = MountPrefix::new("/proxy");
        assert_eq!(prefix.strip("/proxy/proxy/cart"), Some("/proxy/cart"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let prefix = MountPrefix::new("/proxy");
        let once = prefix.apply("/cart?x=1").into_owned();
        assert_eq!(once, "/proxy/cart?x=1");
        assert_eq!(prefix.apply(&once), once);
        assert_eq!(prefix.apply("/proxy"), "/proxy");
        assert_eq!(prefix.apply("/proxy#top"), "/proxy#top");
    }

    #[test]
    fn test_apply_skips_non_root_relative() {
        let prefix = MountPrefix::new("/proxy");
        assert_eq!(prefix.apply("//cdn.example/a.js"), "//cdn.example/a.js");
        assert_eq!(prefix.apply("https://external.example/x"), "https://external.example/x");
        assert_eq!(prefix.apply("cart"), "cart");
        assert_eq!(prefix.apply("#top"), "#top");
    }

    #[test]
    fn test_root_prefix_is_identity() {
        let prefix = MountPrefix::new("");
        assert!(prefix.is_root());
        assert_eq!(prefix.strip("/cart"), None);
        assert_eq!(prefix.apply("/cart"), "/cart");
    }

    #[test]
    fn test_trailing_slash_dropped() {
        assert_eq!(MountPrefix::new("/proxy/").as_str(), "/proxy");
        assert!(MountPrefix::new("/").is_root());
    }
}
