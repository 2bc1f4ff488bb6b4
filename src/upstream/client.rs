//! HTTP client for the fixed upstream origin.
//!
//! # Responsibilities
//! - Forward method, filtered headers and body to the upstream
//! - Return redirects unfollowed
//! - Enforce connect and response deadlines
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` shared by all requests (internally synchronized)
//! - Exactly one upstream call per inbound request, no retries
//! - The client negotiates compression itself and hands back decoded bytes

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use reqwest::redirect::Policy;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::resilience::timeouts::with_deadline;
use crate::routing::{UpstreamOrigin, UpstreamTarget};
use crate::security::headers::forwardable_request_headers;

/// Client issuing the single upstream call for each inbound request.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    host: HeaderValue,
    strip_prefixes: Vec<String>,
    fallback_user_agent: Option<HeaderValue>,
    response_deadline: Duration,
}

impl UpstreamClient {
    /// Build the client from configuration.
    pub fn new(config: &ProxyConfig, origin: &UpstreamOrigin) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to build upstream client: {}", e)))?;

        let host = HeaderValue::from_str(&origin.authority())
            .map_err(|e| ProxyError::Config(format!("invalid upstream host: {}", e)))?;

        let fallback_user_agent = match &config.upstream.user_agent {
            Some(ua) => Some(
                HeaderValue::from_str(ua)
                    .map_err(|e| ProxyError::Config(format!("invalid user_agent: {}", e)))?,
            ),
            None => None,
        };

        Ok(Self {
            client,
            host,
            strip_prefixes: config
                .upstream
                .strip_header_prefixes
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
            fallback_user_agent,
            response_deadline: Duration::from_secs(config.timeouts.request_secs),
        })
    }

    /// Headers sent upstream for an inbound header set.
    pub fn forward_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = forwardable_request_headers(inbound, &self.strip_prefixes);
        headers.insert(header::HOST, self.host.clone());
        if !headers.contains_key(header::USER_AGENT) {
            if let Some(ua) = &self.fallback_user_agent {
                headers.insert(header::USER_AGENT, ua.clone());
            }
        }
        headers
    }

    /// Issue the upstream request. Redirects come back as-is.
    ///
    /// `body` is ignored for GET and HEAD.
    pub async fn send(
        &self,
        method: Method,
        target: &UpstreamTarget,
        inbound_headers: &HeaderMap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, ProxyError> {
        let mut request = self
            .client
            .request(method.clone(), target.url().clone())
            .headers(self.forward_headers(inbound_headers));

        if method != Method::GET && method != Method::HEAD {
            request = request.body(body.unwrap_or_default());
        }

        with_deadline(self.response_deadline, async {
            request.send().await.map_err(upstream_error)
        })
        .await
    }

    /// Buffer the whole upstream body under the response deadline.
    pub async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, ProxyError> {
        with_deadline(self.response_deadline, async {
            response.bytes().await.map_err(upstream_error)
        })
        .await
    }
}

/// Map a client error to the proxy taxonomy, keeping the root cause.
fn upstream_error(err: reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        return ProxyError::UpstreamUnreachable(format!("timed out: {}", error_chain(&err)));
    }
    ProxyError::UpstreamUnreachable(error_chain(&err))
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
