//! Redirect `Location` rewriting.
//!
//! Keeps upstream redirects inside the proxy boundary:
//! - `https://<upstream>/cart` → `<prefix>/cart`
//! - `//<upstream>/cart` → `<prefix>/cart`
//! - `/cart` → `<prefix>/cart`
//! - anything else is left alone

use std::borrow::Cow;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use url::{Position, Url};

use crate::routing::{MountPrefix, UpstreamOrigin};

/// Status codes in `[300, 400)`.
pub fn is_redirect(status: StatusCode) -> bool {
    status.is_redirection()
}

/// Rewrite a single `Location` value.
pub fn rewrite_location<'a>(
    location: &'a str,
    origin: &UpstreamOrigin,
    prefix: &MountPrefix,
) -> Cow<'a, str> {
    if location.starts_with("//") {
        let absolute = format!("{}:{}", origin.scheme(), location);
        return match Url::parse(&absolute) {
            Ok(url) if origin.matches(&url) => prefixed_path(location, &url, prefix),
            _ => Cow::Borrowed(location),
        };
    }

    if location.starts_with('/') {
        return prefix.apply(location);
    }

    match Url::parse(location) {
        Ok(url) if origin.matches(&url) => prefixed_path(location, &url, prefix),
        _ => Cow::Borrowed(location),
    }
}

/// Path, query and fragment of an upstream URL, under the mount prefix.
///
/// A path starting with `//` would read as protocol-relative once the origin
/// is gone, so it always gets the prefix; under a root mount the absolute
/// URL is kept instead.
fn prefixed_path<'a>(location: &'a str, url: &Url, prefix: &MountPrefix) -> Cow<'a, str> {
    let path = &url[Position::BeforePath..];
    if !path.starts_with("//") {
        return Cow::Owned(prefix.apply(path).into_owned());
    }
    if prefix.is_root() {
        Cow::Borrowed(location)
    } else {
        Cow::Owned(format!("{}{}", prefix, path))
    }
}

/// Rewrite the `Location` header in place. Returns true when it changed.
pub fn rewrite_location_header(
    headers: &mut HeaderMap,
    origin: &UpstreamOrigin,
    prefix: &MountPrefix,
) -> bool {
    let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let rewritten = match rewrite_location(location, origin, prefix) {
        Cow::Borrowed(_) => return false,
        Cow::Owned(rewritten) => rewritten,
    };

    match HeaderValue::from_str(&rewritten) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
            true
        }
        Err(_) => false,
    }
}
