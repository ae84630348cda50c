//! Compiled routes.
//!
//! # Design Decisions
//! - Matching is a literal string prefix test, not segment-aware:
//!   `/api` also matches `/api2`
//! - Matching runs on the percent-decoded path, so `/st%61tus` is `/status`
//! - Route identity is the declaration index, stable for the process lifetime

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use percent_encoding::percent_decode_str;

use crate::config::{HandlerKind, RouteConfig};

/// Stable identity of a configured route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub usize);

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "route-{}", self.0)
    }
}

/// A routing rule compiled from configuration. Immutable after startup.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    pub path: String,
    pub handler: HandlerKind,
    pub target: Option<String>,
}

impl Route {
    pub fn new(id: RouteId, config: &RouteConfig) -> Self {
        Self {
            id,
            path: config.path.clone(),
            handler: config.handler,
            target: config.target.clone(),
        }
    }

    /// Returns true if `path` starts with this route's prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path)
    }
}

/// Decode a raw request path. Invalid UTF-8 sequences become U+FFFD.
pub fn decoded_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Compile route configs, preserving declaration order.
pub fn compile(configs: &[RouteConfig]) -> Vec<Route> {
    configs
        .iter()
        .enumerate()
        .map(|(index, config)| Route::new(RouteId(index), config))
        .collect()
}

/// Result of offering a request to a handler.
#[derive(Debug)]
pub enum Outcome {
    /// The handler produced the final response.
    Handled(Response),
    /// The handler could not serve this request; the request is handed back
    /// so later routes can try it.
    Declined(Request<Body>),
}
