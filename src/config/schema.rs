//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the framing proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream origin being proxied.
    pub upstream: UpstreamConfig,

    /// Mount prefix and rewrite behaviour.
    pub proxy: MountConfig,

    /// Framing override headers.
    pub framing: FramingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin URL, scheme and host only (e.g., "https://www.example.com").
    pub origin: String,

    /// Other origins serving the same site (e.g., the bare domain).
    pub aliases: Vec<String>,

    /// Permit a plain `http://` origin. Local testing only.
    pub allow_insecure: bool,

    /// Inbound header name prefixes never forwarded upstream
    /// (platform-injected identity headers).
    pub strip_header_prefixes: Vec<String>,

    /// User-Agent sent when the caller provides none.
    pub user_agent: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.yummypooch.com".to_string(),
            aliases: Vec::new(),
            allow_insecure: false,
            strip_header_prefixes: vec!["x-nf-".to_string()],
            user_agent: None,
        }
    }
}

/// Where the proxy is mounted and how pages are rewritten.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Path prefix the proxy is reachable under. Empty means mounted at `/`.
    pub mount_prefix: String,

    /// Query parameter carrying the target path (e.g., `?path=/cart`).
    pub path_query_param: Option<String>,

    /// Inject the client-side interception script into HTML pages.
    pub inject_interceptor: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/proxy".to_string(),
            path_query_param: None,
            inject_interceptor: true,
        }
    }
}

/// Framing header overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Also emit the legacy `X-Frame-Options: ALLOWALL`.
    pub legacy_allow_all: bool,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            legacy_allow_all: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the upstream response (headers, plus the body for HTML)
    /// in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
