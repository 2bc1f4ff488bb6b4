//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream origin and aliases
//! - Validate the mount prefix shape
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.origin `{0}` is not a valid URL")]
    InvalidOrigin(String),

    #[error("upstream origin `{0}` must be scheme and host only (no path, query or fragment)")]
    OriginHasPath(String),

    #[error("upstream origin `{0}` must use https (set upstream.allow_insecure for local testing)")]
    InsecureOrigin(String),

    #[error("proxy.mount_prefix `{0}` must be empty or start with '/' and not end with '/'")]
    InvalidMountPrefix(String),

    #[error("proxy.path_query_param must not be empty")]
    EmptyQueryParam,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.log_format `{0}` is not one of: pretty, json")]
    UnknownLogFormat(String),

    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_origin(&config.upstream.origin, config.upstream.allow_insecure, &mut errors);
    for alias in &config.upstream.aliases {
        check_origin(alias, config.upstream.allow_insecure, &mut errors);
    }

    let prefix = &config.proxy.mount_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::InvalidMountPrefix(prefix.clone()));
    }

    if matches!(&config.proxy.path_query_param, Some(p) if p.is_empty()) {
        errors.push(ValidationError::EmptyQueryParam);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(origin: &str, allow_insecure: bool, errors: &mut Vec<ValidationError>) {
    let url = match Url::parse(origin) {
        Ok(url) if url.host_str().is_some() => url,
        _ => {
            errors.push(ValidationError::InvalidOrigin(origin.to_string()));
            return;
        }
    };

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        errors.push(ValidationError::OriginHasPath(origin.to_string()));
    }

    match url.scheme() {
        "https" => {}
        "http" if allow_insecure => {}
        _ => errors.push(ValidationError::InsecureOrigin(origin.to_string())),
    }
}
