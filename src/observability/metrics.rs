//! Metrics collection and exposition.
//!
//! # Metrics
//! - `frame_proxy_requests_total` (counter): requests by method, status, body kind
//! - `frame_proxy_request_duration_seconds` (histogram): latency by method
//! - `frame_proxy_transform_failures_total` (counter): HTML bodies relayed raw
//! - `frame_proxy_errors_total` (counter): requests answered with a proxy error, by reason
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, kind: &'static str, start: Instant) {
    ::metrics::counter!(
        "frame_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "kind" => kind
    )
    .increment(1);
    ::metrics::histogram!(
        "frame_proxy_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record an HTML body that could not be rewritten.
pub fn record_transform_failure() {
    ::metrics::counter!("frame_proxy_transform_failures_total").increment(1);
}

/// Record a request answered with a proxy error (bad request, oversize body,
/// unreachable or slow upstream).
pub fn record_error(reason: &'static str) {
    ::metrics::counter!("frame_proxy_errors_total", "reason" => reason).increment(1);
}
