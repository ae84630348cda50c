//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route warnings)
//!     → GatewayConfig (validated, immutable)
//!     → routes compiled once into the dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    FileConfig, GatewayConfig, HandlerKind, ListenerConfig, LogFormat, MonitorConfig,
    ObservabilityConfig, RouteConfig, TimeoutConfig,
};
