//! Top-level error type for startup and serving.
//!
//! Nothing on the request path returns these: request failures are answered
//! with an HTTP response where they happen.

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("epoch file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
