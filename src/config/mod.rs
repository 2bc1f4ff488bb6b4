//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI / environment overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → compiled into pipeline settings shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the upstream origin is fixed for the
//!   lifetime of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::FramingConfig;
pub use schema::ListenerConfig;
pub use schema::MountConfig;
pub use schema::ProxyConfig;
pub use schema::UpstreamConfig;
