//! Cluster state monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! epoch producer (file writer, in-process publisher)
//!     → file.rs / watch.rs (StateSource implementations)
//!     → source.rs (StateSource: current_version, wait_for_change)
//!     → endpoint.rs (long-poll response per monitor route)
//! ```
//!
//! # Design Decisions
//! - The epoch is opaque; only equality with the client's value matters
//! - Every wait is bounded, so a silent source never pins a request forever
//! - Waiters share one watch channel; a change wakes all of them at once

pub mod endpoint;
pub mod file;
pub mod source;
pub mod watch;

pub use endpoint::MonitorEndpoint;
pub use file::FileEpochSource;
pub use source::{Epoch, StateSource};
pub use watch::WatchStateSource;
