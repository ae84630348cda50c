//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Report route target defects without rejecting the config
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - A broken route target is served as a per-request 500, so it is a warning here

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, HandlerKind};

/// A semantic problem that prevents the gateway from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no routes configured")]
    NoRoutes,

    #[error("route {index}: path {path:?} must start with '/'")]
    RelativePath { index: usize, path: String },

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("request timeout ({request_secs}s) must exceed monitor wait ({wait_secs}s)")]
    TimeoutTooShort { request_secs: u64, wait_secs: u64 },
}

/// Check the configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    for (index, route) in config.routes.iter().enumerate() {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                index,
                path: route.path.clone(),
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.monitor.wait_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("monitor.wait_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    } else if config.timeouts.request_secs <= config.monitor.wait_secs {
        errors.push(ValidationError::TimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            wait_secs: config.monitor.wait_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Describe route targets that will fail at request time.
pub fn route_warnings(config: &GatewayConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    for (index, route) in config.routes.iter().enumerate() {
        match (route.handler, route.target.as_deref()) {
            (HandlerKind::Proxy, None) | (HandlerKind::File, None) => warnings.push(format!(
                "route {index} ({}): {} handler without target never matches",
                route.path, route.handler
            )),
            (HandlerKind::Proxy, Some(target)) => {
                if let Err(e) = url::Url::parse(target) {
                    warnings.push(format!(
                        "route {index} ({}): invalid proxy target {target:?}: {e}",
                        route.path
                    ));
                }
            }
            (HandlerKind::Monitor, Some(_)) => warnings.push(format!(
                "route {index} ({}): monitor handler ignores its target",
                route.path
            )),
            _ => {}
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn base() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:8080".into();
        config
            .routes
            .push(RouteConfig::new("/monitor", HandlerKind::Monitor, None));
        config
    }

    #[test]
    fn accepts_minimal_config() {
        assert_eq!(validate_config(&base()), Ok(()));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = base();
        config.routes.push(RouteConfig::new("api", HandlerKind::Proxy, None));
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 30;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::RelativePath {
            index: 1,
            path: "api".into()
        }));
        assert!(errors.contains(&ValidationError::TimeoutTooShort {
            request_secs: 30,
            wait_secs: 60
        }));
    }

    #[test]
    fn empty_route_list_is_an_error() {
        let mut config = base();
        config.routes.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoRoutes]));
    }

    #[test]
    fn warns_about_broken_targets() {
        let mut config = base();
        config
            .routes
            .push(RouteConfig::new("/api", HandlerKind::Proxy, Some("not a url \t")));
        config.routes.push(RouteConfig::new("/", HandlerKind::File, None));
        config.routes.push(RouteConfig::new(
            "/ok",
            HandlerKind::Proxy,
            Some("http://127.0.0.1:3000"),
        ));

        let warnings = route_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("invalid proxy target"));
        assert!(warnings[1].contains("without target"));
    }
}
