//! Response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response
//!     → redirect.rs (3xx with Location: keep it inside the proxy, no body work)
//!     → body.rs (classify by content type)
//!         → html.rs (buffer, collapse origins, prefix links, inject interceptor)
//!         → passthrough (stream bytes untouched)
//! ```
//!
//! # Design Decisions
//! - Rewrites are pure string functions with no shared state
//! - Every rewrite is idempotent under the mount prefix
//! - A failed rewrite never drops the response

pub mod body;
pub mod html;
pub mod redirect;

pub use body::{BodyKind, BodyTransformer, TransformedBody};
pub use html::HtmlRewriter;
