//! Routing subsystem: where a request goes upstream.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → prefix.rs (strip the mount prefix once)
//!     → target.rs (re-anchor on the upstream origin)
//!     → UpstreamTarget or InvalidRequest
//!
//! Compiled at startup:
//!     UpstreamConfig → origin.rs (primary + aliases)
//!     MountConfig    → prefix.rs
//! ```
//!
//! # Design Decisions
//! - Compiled at startup, immutable at runtime
//! - No regex in the hot path (constant prefix comparisons only)
//! - Deterministic: same input always maps to the same target

pub mod origin;
pub mod prefix;
pub mod target;

pub use origin::UpstreamOrigin;
pub use prefix::MountPrefix;
pub use target::{RequestNormalizer, UpstreamTarget};
