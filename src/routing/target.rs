//! Request normalization: inbound path + query → upstream URL.
//!
//! # Responsibilities
//! - Strip the mount prefix (once) from the inbound path
//! - Optionally take the target from a query parameter (`?path=/cart`)
//! - Re-anchor the path at `/` on the upstream origin
//!
//! # Design Decisions
//! - Pure function of its inputs, no I/O
//! - The query string is appended byte-for-byte
//! - The resulting URL must still point at the upstream host; anything else is
//!   rejected before a fetch is attempted

use std::sync::Arc;

use url::{form_urlencoded, Url};

use crate::error::ProxyError;
use crate::routing::origin::UpstreamOrigin;
use crate::routing::prefix::MountPrefix;

/// Absolute URL of the upstream resource for one request.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    raw: String,
    url: Url,
}

impl UpstreamTarget {
    /// The URL exactly as assembled from origin, path and query.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed URL handed to the HTTP client.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Maps inbound request paths onto the upstream origin.
#[derive(Debug, Clone)]
pub struct RequestNormalizer {
    origin: Arc<UpstreamOrigin>,
    prefix: MountPrefix,
    path_query_param: Option<String>,
}

impl RequestNormalizer {
    pub fn new(
        origin: Arc<UpstreamOrigin>,
        prefix: MountPrefix,
        path_query_param: Option<String>,
    ) -> Self {
        Self {
            origin,
            prefix,
            path_query_param,
        }
    }

    /// Build the upstream target for an inbound path and optional query.
    pub fn normalize(&self, path: &str, query: Option<&str>) -> Result<UpstreamTarget, ProxyError> {
        if let Some(target) = self.query_param_target(query) {
            let target = target?;
            return self.build(&target, None);
        }
        self.build(path, query)
    }

    fn query_param_target(&self, query: Option<&str>) -> Option<Result<String, ProxyError>> {
        let param = self.path_query_param.as_deref()?;
        let (_, value) = form_urlencoded::parse(query?.as_bytes()).find(|(k, _)| k == param)?;
        if value.starts_with('/') {
            Some(Ok(value.into_owned()))
        } else {
            Some(Err(ProxyError::InvalidRequest(format!(
                "`{}` parameter must be a root-relative path",
                param
            ))))
        }
    }

    fn build(&self, path: &str, query: Option<&str>) -> Result<UpstreamTarget, ProxyError> {
        if !path.starts_with('/') {
            return Err(ProxyError::InvalidRequest(format!(
                "path `{}` is not absolute",
                path
            )));
        }

        let path = self.prefix.strip(path).unwrap_or(path);
        let path = if path.is_empty() { "/" } else { path };

        let mut raw = String::with_capacity(self.origin.as_str().len() + path.len() + 16);
        raw.push_str(self.origin.as_str());
        raw.push_str(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(query);
        }

        let url = Url::parse(&raw)
            .map_err(|e| ProxyError::InvalidRequest(format!("cannot build upstream URL: {}", e)))?;
        if !self.origin.matches(&url) {
            return Err(ProxyError::InvalidRequest(format!(
                "target `{}` escapes the upstream origin",
                raw
            )));
        }

        Ok(UpstreamTarget { raw, url })
    }
}
