//! Content-type-conditional body transformation.
//!
//! # Responsibilities
//! - Classify upstream bodies as HTML or passthrough
//! - Decode HTML per the declared charset and run the rewriter
//! - Fall back to the raw bytes when decoding or rewriting fails
//!
//! # Design Decisions
//! - HTML is buffered (whole-document rewrite); everything else streams
//! - Passthrough bodies are never decoded or re-encoded
//! - Only UTF-8 (and its ASCII subset) is rewritten; other charsets are relayed raw

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, StatusCode};
use futures_util::TryStreamExt;

use crate::error::ProxyError;
use crate::observability::metrics;
use crate::rewrite::html::HtmlRewriter;

/// How an upstream body is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `text/html`: buffered and rewritten.
    Html,
    /// Anything else: streamed byte-for-byte.
    Passthrough,
}

/// Classify a response by its `Content-Type`.
pub fn classify(headers: &HeaderMap) -> BodyKind {
    let is_html = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false);

    if is_html {
        BodyKind::Html
    } else {
        BodyKind::Passthrough
    }
}

/// True when the response carries an HTML body worth rewriting.
pub fn should_rewrite(kind: BodyKind, method: &Method, status: StatusCode) -> bool {
    kind == BodyKind::Html
        && *method != Method::HEAD
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::NOT_MODIFIED
}

/// The `charset` parameter of a content type, lowercased.
pub fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
        } else {
            None
        }
    })
}

/// Decode an HTML body according to the declared charset.
pub fn decode_html<'a>(raw: &'a [u8], content_type: Option<&str>) -> Result<&'a str, ProxyError> {
    match content_type.and_then(charset).as_deref() {
        None | Some("utf-8" | "utf8" | "us-ascii") => std::str::from_utf8(raw)
            .map_err(|e| ProxyError::TransformFailure(format!("body is not valid UTF-8: {}", e))),
        Some(other) => Err(ProxyError::TransformFailure(format!(
            "unsupported charset `{}`",
            other
        ))),
    }
}

/// Outbound body: rewritten in memory, or streamed from upstream.
pub enum TransformedBody {
    Buffered(Bytes),
    Streaming(reqwest::Response),
}

impl TransformedBody {
    pub fn into_body(self) -> Body {
        match self {
            TransformedBody::Buffered(bytes) => Body::from(bytes),
            TransformedBody::Streaming(response) => {
                let stream = response.bytes_stream().inspect_err(|e| {
                    tracing::warn!(error = %e, "Upstream body stream interrupted");
                });
                Body::from_stream(stream)
            }
        }
    }
}

/// Applies the HTML rewrite to buffered bodies.
#[derive(Debug, Clone)]
pub struct BodyTransformer {
    rewriter: HtmlRewriter,
}

impl BodyTransformer {
    pub fn new(rewriter: HtmlRewriter) -> Self {
        Self { rewriter }
    }

    /// Decode and rewrite an HTML body.
    pub fn rewrite_html(&self, raw: &[u8], content_type: Option<&str>) -> Result<String, ProxyError> {
        let text = decode_html(raw, content_type)?;
        Ok(self.rewriter.rewrite(text))
    }

    /// Rewrite an HTML body, relaying the raw bytes if that fails.
    pub fn transform_html(&self, raw: Bytes, content_type: Option<&str>) -> Bytes {
        match self.rewrite_html(&raw, content_type) {
            Ok(rewritten) => Bytes::from(rewritten),
            Err(e) => {
                tracing::warn!(error = %e, "HTML rewrite skipped, relaying original body");
                metrics::record_transform_failure();
                raw
            }
        }
    }
}
