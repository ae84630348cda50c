//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, percent-decoded)
//!     → dispatcher.rs (ordered scan over routes)
//!     → route.rs (literal prefix test)
//!     → monitor / files / proxy handler
//!         → Handled(response): done
//!         → Declined(request): try the next matching route
//!     → no handler left: 500 Unmatched request
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Route[] with RouteId = declaration index
//!     → Freeze as immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Declaration order is priority; no sorting
//! - Prefix matching is literal, `/api` matches `/api2`

pub mod dispatcher;
pub mod route;

pub use dispatcher::Dispatcher;
pub use route::{compile, decoded_path, Outcome, Route, RouteId};
