//! Conditional static file serving.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::Response;
use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::files::path;
use crate::routing::{Outcome, Route};

/// Serves files below each file route's target directory.
#[derive(Debug, Clone)]
pub struct FileServer {
    cache_control: HeaderValue,
}

impl FileServer {
    pub fn new(max_age_secs: u64) -> Self {
        let cache_control = HeaderValue::try_from(format!("public, max-age={max_age_secs}"))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=2592000"));
        Self { cache_control }
    }

    /// Serve the file the request maps to.
    ///
    /// Declines when the route has no target, when the decoded path is not
    /// valid UTF-8, and when the path is missing or a directory. Any method
    /// other than HEAD is answered as a GET.
    pub async fn serve(&self, route: &Route, mut request: Request<Body>) -> Outcome {
        let Some(base) = route.target.as_deref() else {
            return Outcome::Declined(request);
        };
        let Some(filename) = path::resolve(base, request.uri().path()) else {
            return Outcome::Declined(request);
        };
        let metadata = match tokio::fs::metadata(&filename).await {
            Ok(metadata) if !metadata.is_dir() => metadata,
            _ => return Outcome::Declined(request),
        };
        tracing::debug!(path = ?filename, "[file]");

        let etag = etag_for(&metadata);
        if if_none_match(request.headers(), &etag) {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::NOT_MODIFIED;
            return Outcome::Handled(response);
        }

        if request.method() != Method::HEAD {
            *request.method_mut() = Method::GET;
        }
        let mut response = match ServeFile::new(&filename).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        };
        if !response.status().is_success() {
            return Outcome::Handled(response);
        }
        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, self.cache_control.clone());
        if let Ok(value) = HeaderValue::try_from(etag) {
            headers.insert(header::ETAG, value);
        }
        Outcome::Handled(response)
    }
}

/// Weak validator from modification time (unix seconds) and size, both in hex.
pub fn weak_etag(mtime_secs: i64, size: u64) -> String {
    let mtime = if mtime_secs < 0 {
        format!("-{:x}", mtime_secs.unsigned_abs())
    } else {
        format!("{mtime_secs:x}")
    };
    format!("W/\"{mtime}-{size:x}\"")
}

fn etag_for(metadata: &Metadata) -> String {
    let mtime = metadata.modified().map(unix_seconds).unwrap_or(0);
    weak_etag(mtime, metadata.len())
}

/// Whole seconds since the epoch, rounded down (also before 1970).
fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(e) => {
            let before = e.duration();
            let secs = before.as_secs() as i64;
            if before.subsec_nanos() > 0 {
                -secs - 1
            } else {
                -secs
            }
        }
    }
}

/// True if the first `If-None-Match` header mentions `etag`.
fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(etag))
}
