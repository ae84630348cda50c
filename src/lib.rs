//! Console gateway library.
//!
//! A single HTTP ingress for a cluster management UI: ordered path-prefix
//! routes dispatch to a long-poll status monitor, static files, or reverse
//! proxies to backend services.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Route handlers
pub mod files;
pub mod monitor;
pub mod proxy;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Dispatcher;
