//! Ordered route dispatch.
//!
//! # Responsibilities
//! - Walk the routes in declaration order
//! - Offer the request to every route whose prefix matches until one handles it
//! - Answer 500 "Unmatched request" when none does
//!
//! # Design Decisions
//! - Plain loop over an immutable slice; order is the whole routing policy
//! - A declining handler hands the request back untouched
//! - Only the terminal error is written here; handlers write their own responses

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{GatewayConfig, HandlerKind};
use crate::files::FileServer;
use crate::http::response::unmatched;
use crate::monitor::{MonitorEndpoint, StateSource};
use crate::observability::metrics;
use crate::proxy::ProxyCache;
use crate::routing::route::{compile, decoded_path, Outcome, Route};

/// Dispatches requests across the configured routes.
pub struct Dispatcher {
    routes: Vec<Route>,
    monitor: MonitorEndpoint,
    files: FileServer,
    proxies: ProxyCache,
}

impl Dispatcher {
    pub fn new(config: &GatewayConfig, source: Arc<dyn StateSource>) -> Self {
        Self {
            routes: compile(&config.routes),
            monitor: MonitorEndpoint::new(source, Duration::from_secs(config.monitor.wait_secs)),
            files: FileServer::new(config.files.max_age_secs),
            proxies: ProxyCache::new(),
        }
    }

    /// Replace the monitor endpoint, e.g. to shorten its wait.
    pub fn with_monitor(mut self, monitor: MonitorEndpoint) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn proxies(&self) -> &ProxyCache {
        &self.proxies
    }

    /// Serve `request` with the first matching route that accepts it.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        // File and proxy handlers still see the raw URI.
        let path = decoded_path(request.uri().path());
        let mut request = request;

        for route in &self.routes {
            if !route.matches(&path) {
                continue;
            }

            let outcome = match route.handler {
                HandlerKind::Monitor => self.monitor.serve(route, request),
                HandlerKind::File => self.files.serve(route, request).await,
                HandlerKind::Proxy => self.proxies.serve(route, request).await,
            };

            match outcome {
                Outcome::Handled(response) => {
                    metrics::record_request(route.handler.as_str(), response.status().as_u16(), start);
                    return response;
                }
                Outcome::Declined(returned) => {
                    tracing::trace!(route = %route.id, path = %path, "Route declined");
                    request = returned;
                }
            }
        }

        tracing::debug!(path = %path, "Unmatched request");
        let response = unmatched(&path);
        metrics::record_request("unmatched", response.status().as_u16(), start);
        response
    }
}
