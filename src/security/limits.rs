//! Request body limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Buffer the inbound body for forwarding
//!
//! # Design Decisions
//! - Declared oversize bodies are rejected by `RequestBodyLimitLayer` before
//!   the handler runs; streamed oversize bodies fail while buffering
//! - Both paths return 413 Payload Too Large

use axum::body::{Body, Bytes};
use http_body_util::LengthLimitError;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::ProxyError;

/// Layer rejecting bodies whose declared length exceeds `max_body_size`.
pub fn body_limit_layer(max_body_size: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_body_size)
}

/// Buffer an inbound body, failing with `PayloadTooLarge` past `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        if is_length_limit(&e) {
            ProxyError::PayloadTooLarge { limit }
        } else {
            ProxyError::InvalidRequest(format!("failed to read request body: {}", e))
        }
    })
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
