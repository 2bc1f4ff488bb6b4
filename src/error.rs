//! Proxy error taxonomy.
//!
//! Every stage of the pipeline reports failures through [`ProxyError`]. The
//! HTTP handler converts them into plain-text responses via [`IntoResponse`],
//! so no error ever escapes the request boundary.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced while proxying a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Inbound path or URL could not be turned into an upstream target.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Inbound body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// DNS, connect or TLS failure reaching the upstream.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Upstream did not answer within the deadline.
    #[error("upstream timed out after {0} seconds")]
    UpstreamTimeout(u64),

    /// HTML body could not be decoded or rewritten.
    #[error("transform failed: {0}")]
    TransformFailure(String),

    /// Startup configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    /// Status code sent to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::TransformFailure(_) | ProxyError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ProxyError::InvalidRequest(_) => "invalid_request",
            ProxyError::PayloadTooLarge { .. } => "payload_too_large",
            ProxyError::UpstreamUnreachable(_) => "unreachable",
            ProxyError::UpstreamTimeout(_) => "timeout",
            ProxyError::TransformFailure(_) => "transform",
            ProxyError::Config(_) => "config",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = format!("Proxy error: {}", self);
        let mut response = (self.status(), body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::UpstreamUnreachable("refused".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ProxyError::UpstreamTimeout(30).status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(ProxyError::UpstreamTimeout(30).status().is_server_error());
    }

    #[tokio::test]
    async fn test_error_response_has_diagnostic_body() {
        let response = ProxyError::UpstreamUnreachable("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Proxy error:"));
        assert!(text.contains("connection refused"));
    }
}
