//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → client connect timeout (reqwest)
//!     → timeouts.rs (deadline on response headers and buffered body reads)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - One attempt per inbound request, no retries
//! - An expired deadline surfaces as 504, a failed connect as 502

pub mod timeouts;
