//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Ordered route definitions. Declaration order is matching order.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Long-poll monitor settings.
    pub monitor: MonitorConfig,

    /// Static file settings.
    pub files: FileConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Which strategy serves a matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Long-poll status endpoint backed by the state source.
    Monitor,
    /// Static files below the route's target directory.
    File,
    /// Reverse proxy to the route's target URL.
    Proxy,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Monitor => "monitor",
            HandlerKind::File => "file",
            HandlerKind::Proxy => "proxy",
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single routing rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Literal path prefix to match.
    pub path: String,

    /// Handler kind for requests under `path`.
    pub handler: HandlerKind,

    /// Backend base URL (proxy) or base directory (file).
    #[serde(default)]
    pub target: Option<String>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>, handler: HandlerKind, target: Option<&str>) -> Self {
        Self {
            path: path.into(),
            handler,
            target: target.map(str::to_string),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to produce response headers, in seconds.
    /// Must exceed the monitor wait.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 75 }
    }
}

/// Monitor endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Upper bound on a single long-poll wait, in seconds.
    pub wait_secs: u64,

    /// File whose content is the current epoch. When unset the epoch stays unknown
    /// unless something publishes into the in-process source.
    pub epoch_file: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            wait_secs: 60,
            epoch_file: None,
        }
    }
}

/// Static file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    /// `max-age` advertised in `Cache-Control` for served files.
    pub max_age_secs: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 2_592_000, // 30 days
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ordered_routes() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:7630"

            [[routes]]
            path = "/monitor"
            handler = "monitor"

            [[routes]]
            path = "/api"
            handler = "proxy"
            target = "http://127.0.0.1:3000"

            [[routes]]
            path = "/"
            handler = "file"
            target = "/usr/share/console/public"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:7630");
        let kinds: Vec<_> = config.routes.iter().map(|r| r.handler).collect();
        assert_eq!(
            kinds,
            vec![HandlerKind::Monitor, HandlerKind::Proxy, HandlerKind::File]
        );
        assert_eq!(config.routes[0].target, None);
        assert_eq!(config.routes[1].target.as_deref(), Some("http://127.0.0.1:3000"));
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.monitor.wait_secs, 60);
        assert_eq!(config.files.max_age_secs, 2_592_000);
        assert_eq!(config.timeouts.request_secs, 75);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn rejects_unknown_handler() {
        let result: Result<GatewayConfig, _> = toml::from_str(
            r#"
            [[routes]]
            path = "/"
            handler = "websocket"
            "#,
        );
        assert!(result.is_err());
    }
}
