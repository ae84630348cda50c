//! Response helpers.
//!
//! # Responsibilities
//! - Build the plain-text error responses the gateway writes itself
//!
//! # Design Decisions
//! - Error bodies are `text/plain` with `nosniff`, so browsers never render them as HTML
//! - Handlers that succeed build their own responses; only failures go through here

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

/// Build a plain-text error response.
pub fn plain_error(status: StatusCode, message: impl Into<String>) -> Response {
    let mut response = Response::new(Body::from(message.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// 500 written when no route handled the request.
pub fn unmatched(path: &str) -> Response {
    plain_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Unmatched request: {path}."),
    )
}

/// 500 written when a proxy route's target is unusable.
pub fn bad_configuration() -> Response {
    plain_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Bad web server configuration.",
    )
}
