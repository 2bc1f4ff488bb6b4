//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (check request body size)
//!     → headers.rs (drop Host, X-Forwarded-*, hop-by-hop)
//!     → Forward upstream
//!
//! Upstream response:
//!     → headers.rs (drop framing/transport headers, inject framing overrides)
//!     → Pass to body transformer
//! ```
//!
//! # Design Decisions
//! - Fail closed on oversize input
//! - No proxy identity leaks upstream
//! - Framing overrides always win over upstream values

pub mod headers;
pub mod limits;
