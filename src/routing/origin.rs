//! The fixed upstream origin and its aliases.

use url::{Origin, Url};

use crate::error::ProxyError;

/// The site being proxied: one primary origin plus optional aliases that
/// serve the same content (e.g. the bare domain).
#[derive(Debug, Clone)]
pub struct UpstreamOrigin {
    primary: Url,
    origins: Vec<Origin>,
    serialized: Vec<String>,
}

impl UpstreamOrigin {
    /// Parse the primary origin and aliases.
    pub fn new(origin: &str, aliases: &[String]) -> Result<Self, ProxyError> {
        let primary = parse_origin(origin)?;
        let mut origins = vec![primary.origin()];
        for alias in aliases {
            let alias = parse_origin(alias)?.origin();
            if !origins.contains(&alias) {
                origins.push(alias);
            }
        }
        let serialized = origins.iter().map(Origin::ascii_serialization).collect();

        Ok(Self {
            primary,
            origins,
            serialized,
        })
    }

    /// Primary origin serialized without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.serialized[0]
    }

    /// Value for the upstream `Host` header (`host[:port]`).
    pub fn authority(&self) -> String {
        let host = self.primary.host_str().unwrap_or_default();
        match self.primary.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// True when `url` is served by the upstream (primary or alias).
    pub fn matches(&self, url: &Url) -> bool {
        let origin = url.origin();
        self.origins.contains(&origin)
    }

    /// Every upstream origin serialized as `scheme://host[:port]`.
    pub fn serialized(&self) -> &[String] {
        &self.serialized
    }

    /// Protocol-relative authorities (`//host[:port]`) of every upstream origin.
    pub fn protocol_relative(&self) -> Vec<String> {
        self.serialized
            .iter()
            .filter_map(|s| s.find("//").map(|i| s[i..].to_string()))
            .collect()
    }

    /// Scheme of the primary origin.
    pub fn scheme(&self) -> &str {
        self.primary.scheme()
    }
}

fn parse_origin(origin: &str) -> Result<Url, ProxyError> {
    let url = Url::parse(origin)
        .map_err(|e| ProxyError::Config(format!("invalid upstream origin `{}`: {}", origin, e)))?;
    if url.host_str().is_none() {
        return Err(ProxyError::Config(format!(
            "upstream origin `{}` has no host",
            origin
        )));
    }
    Ok(url)
}
