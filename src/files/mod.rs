//! Static file subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → path.rs (decode, confine below target, clean)
//!     → server.rs (stat, weak ETag, If-None-Match, ServeFile)
//! ```
//!
//! # Design Decisions
//! - Missing files and directories decline instead of failing, so a later route can serve them
//! - ETag is weak and derived from mtime + size, not content
//! - Range and If-Modified-Since handling is delegated to tower-http

pub mod path;
pub mod server;

pub use server::FileServer;
