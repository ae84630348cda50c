//! Long-poll monitor endpoint.
//!
//! A client polls `GET <path>?<epoch>` (or `<path>.json?<epoch>`) with the last
//! epoch it saw. If the state has moved on the new epoch comes back at once;
//! otherwise the request is held until the state changes or the wait expires.
//!
//! Response headers are sent before any waiting: the handler returns right away
//! with a streaming body whose only chunk is produced once the wait is over.
//! If the client goes away the body is dropped and the wait with it.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures_util::stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::monitor::source::{Epoch, StateSource};
use crate::observability::metrics;
use crate::routing::{decoded_path, Outcome, Route};

const ALLOW_METHODS: &str = "POST, GET, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Origin, Content-Type, Accept, Authorization, X-CSRF-Token, Token";
const CORS_MAX_AGE: &str = "1728000";

/// Serves monitor routes against a shared state source.
#[derive(Clone)]
pub struct MonitorEndpoint {
    source: Arc<dyn StateSource>,
    wait: Duration,
}

impl MonitorEndpoint {
    pub fn new(source: Arc<dyn StateSource>, wait: Duration) -> Self {
        Self { source, wait }
    }

    /// Handle `request` if it targets the route's exact path, else decline.
    pub fn serve(&self, route: &Route, request: Request<Body>) -> Outcome {
        let path = decoded_path(request.uri().path());
        if path != route.path && path.strip_suffix(".json") != Some(route.path.as_str()) {
            return Outcome::Declined(request);
        }

        let client_epoch = client_epoch(request.uri().query());
        tracing::debug!(path = %path, client_epoch = %client_epoch, "[monitor]");

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        if let Some(origin) = request.headers().get(header::ORIGIN) {
            if !origin.is_empty() {
                insert_cors_headers(headers, origin.clone());
            }
        }

        let source = self.source.clone();
        let wait = self.wait;
        let body = stream::once(async move {
            let epoch = resolve_epoch(source.as_ref(), &client_epoch, wait).await;
            Ok::<_, Infallible>(Bytes::from(render_body(&epoch)))
        });
        *response.body_mut() = Body::from_stream(body);

        Outcome::Handled(response)
    }
}

fn insert_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(CORS_MAX_AGE),
    );
}

/// The client's epoch is the raw query up to the first `&`, unparsed.
pub fn client_epoch(query: Option<&str>) -> Epoch {
    let raw = query.and_then(|q| q.split('&').next()).unwrap_or("");
    Epoch::new(raw)
}

/// Decide which epoch to report, waiting if the client is already up to date
/// or the source has nothing yet.
pub async fn resolve_epoch(source: &dyn StateSource, client: &Epoch, wait: Duration) -> Epoch {
    let current = source.current_version().unwrap_or_default();
    if !current.is_unknown() && current != *client {
        return current;
    }

    let latest = source.wait_for_change(wait, &current).await;
    metrics::record_monitor_wait(latest != current);
    latest
}

pub fn render_body(epoch: &Epoch) -> String {
    format!("{}\n", serde_json::json!({ "epoch": epoch.as_str() }))
}
