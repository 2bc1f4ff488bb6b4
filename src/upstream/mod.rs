//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamTarget + inbound method/headers/body
//!     → client.rs (filter headers, send, manual redirects)
//!     → reqwest::Response (status, headers, lazy body)
//!     → or UpstreamUnreachable / UpstreamTimeout
//! ```

pub mod client;

pub use client::UpstreamClient;
