//! Framing reverse proxy library.
//!
//! Serves a single fixed upstream site under a mount prefix so it can be
//! embedded in a cross-origin iframe: framing headers are replaced and HTML
//! links are rewritten to route back through the proxy.

// Core pipeline
pub mod http;
pub mod rewrite;
pub mod routing;
pub mod upstream;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
