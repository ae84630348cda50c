//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! proxy route matched
//!     → cache.rs (lookup or build the route's proxy)
//!     → reverse.rs (rewrite URI, strip hop-by-hop, forward)
//!     → backend response relayed as-is
//! ```
//!
//! # Design Decisions
//! - One shared connection pool; proxies are cheap handles onto it
//! - No retries: upstream failures surface as 502 immediately
//! - An unusable target is a configuration defect, answered with 500

pub mod cache;
pub mod reverse;

pub use cache::ProxyCache;
pub use reverse::{ProxyError, ReverseProxy};
