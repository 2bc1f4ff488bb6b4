//! Header manipulation and framing overrides.
//!
//! # Responsibilities
//! - Choose which inbound headers are forwarded upstream
//! - Strip hop-by-hop and identity-leaking headers
//! - Sanitize upstream response headers and inject framing overrides
//!
//! # Design Decisions
//! - Never forward X-Forwarded-* or platform identity headers upstream
//! - Deny-list filtering happens before overrides, so overrides always win
//! - Header names are compared case-insensitively (HeaderName is lowercase)

use axum::http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue,
};

use crate::config::FramingConfig;

/// Response headers never copied from the upstream.
pub const RESPONSE_DENY_LIST: [HeaderName; 6] = [
    header::CONTENT_LENGTH,
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::X_FRAME_OPTIONS,
    header::CONTENT_SECURITY_POLICY,
];

/// Request headers never forwarded upstream.
const REQUEST_DENY_LIST: [&str; 14] = [
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "accept-encoding",
    "forwarded",
    "x-real-ip",
    "via",
];

/// Value injected as `Content-Security-Policy`.
pub const FRAME_ANCESTORS_ANY: &str = "frame-ancestors *";

/// Value injected as `X-Frame-Options` when the legacy header is enabled.
pub const LEGACY_ALLOW_ALL: &str = "ALLOWALL";

/// Copy the inbound headers that may be forwarded upstream.
///
/// `strip_prefixes` lists lowercase name prefixes of platform-injected
/// headers (e.g. `x-nf-`).
pub fn forwardable_request_headers(inbound: &HeaderMap, strip_prefixes: &[String]) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        let lower = name.as_str();
        if REQUEST_DENY_LIST.contains(&lower)
            || lower.starts_with("x-forwarded-")
            || strip_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
        {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

/// Sanitize upstream response headers for the caller.
pub fn sanitize_response_headers(upstream: &HeaderMap, framing: &FramingConfig) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + 2);
    for (name, value) in upstream {
        if RESPONSE_DENY_LIST.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(FRAME_ANCESTORS_ANY),
    );
    if framing.legacy_allow_all {
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static(LEGACY_ALLOW_ALL));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("Content-Type", HeaderValue::from_static("text/html; charset=utf-8"));
        h.insert("Content-Length", HeaderValue::from_static("1234"));
        h.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        h.insert("Transfer-Encoding", HeaderValue::from_static("chunked"));
        h.insert("Connection", HeaderValue::from_static("keep-alive"));
        h.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
        h.insert(
            "Content-Security-Policy",
            HeaderValue::from_static("frame-ancestors 'none'; default-src 'self'"),
        );
        h.append("Set-Cookie", HeaderValue::from_static("a=1"));
        h.append("Set-Cookie", HeaderValue::from_static("b=2"));
        h
    }

    #[test]
    fn test_deny_list_removed_and_overrides_set() {
        let out = sanitize_response_headers(&upstream_headers(), &FramingConfig::default());

        assert!(out.get("content-length").is_none());
        assert!(out.get("content-encoding").is_none());
        assert!(out.get("transfer-encoding").is_none());
        assert!(out.get("connection").is_none());
        assert_eq!(out.get("x-frame-options").unwrap(), "ALLOWALL");
        assert_eq!(out.get_all("content-security-policy").iter().count(), 1);
        assert_eq!(out.get("content-security-policy").unwrap(), "frame-ancestors *");
        assert_eq!(out.get("content-type").unwrap(), "text/html; charset=utf-8");
        assert_eq!(out.get_all("set-cookie").iter().count(), 2);
    }

    #[test]
    fn test_legacy_header_disabled() {
        let framing = FramingConfig {
            legacy_allow_all: false,
        };
        let out = sanitize_response_headers(&upstream_headers(), &framing);
        assert!(out.get("x-frame-options").is_none());
        assert_eq!(out.get("content-security-policy").unwrap(), "frame-ancestors *");
    }

    #[test]
    fn test_request_headers_filtered() {
        let mut inbound = HeaderMap::new();
        inbound.insert("Host", HeaderValue::from_static("proxy.example"));
        inbound.insert("User-Agent", HeaderValue::from_static("Mobile Safari"));
        inbound.insert("Cookie", HeaderValue::from_static("session=1"));
        inbound.insert("X-Forwarded-For", HeaderValue::from_static("10.0.0.1"));
        inbound.insert("X-Forwarded-Host", HeaderValue::from_static("proxy.example"));
        inbound.insert("X-Nf-Client-Connection-Ip", HeaderValue::from_static("10.0.0.1"));
        inbound.insert("Accept-Encoding", HeaderValue::from_static("gzip, br"));
        inbound.insert("Connection", HeaderValue::from_static("keep-alive"));

        let out = forwardable_request_headers(&inbound, &["x-nf-".to_string()]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.get("user-agent").unwrap(), "Mobile Safari");
        assert_eq!(out.get("cookie").unwrap(), "session=1");
    }
}
