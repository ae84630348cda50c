//! Single-target reverse proxy.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the target origin
//! - Strip hop-by-hop headers in both directions
//! - Append the client address to X-Forwarded-For
//! - Stream request and response bodies without buffering

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri, Version};
use axum::response::Response;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::http::response::plain_error;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Why a proxy target could not be turned into a proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("unsupported target scheme {0:?} (only http is supported)")]
    UnsupportedScheme(String),

    #[error("target URL {0:?} has no host")]
    MissingHost(String),

    #[error("target URL {0:?} has an invalid authority")]
    InvalidAuthority(String),
}

/// Forwards requests to one backend origin.
#[derive(Debug, Clone)]
pub struct ReverseProxy {
    target: Url,
    authority: Authority,
    client: Client<HttpConnector, Body>,
}

impl ReverseProxy {
    pub fn new(target: Url, client: Client<HttpConnector, Body>) -> Result<Self, ProxyError> {
        if target.scheme() != "http" {
            return Err(ProxyError::UnsupportedScheme(target.scheme().to_string()));
        }
        let host = target
            .host_str()
            .ok_or_else(|| ProxyError::MissingHost(target.to_string()))?;
        let authority = match target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority)
            .map_err(|_| ProxyError::InvalidAuthority(target.to_string()))?;

        Ok(Self {
            target,
            authority,
            client,
        })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Forward `request` and relay the backend's response.
    pub async fn forward(&self, request: Request<Body>, client_addr: Option<SocketAddr>) -> Response {
        let (mut parts, body) = request.into_parts();

        let rewritten = rewrite_path_and_query(&self.target, parts.uri.path(), parts.uri.query());
        let uri = PathAndQuery::from_str(&rewritten).map_err(axum::http::Error::from).and_then(|pq| {
            Uri::builder()
                .scheme(Scheme::HTTP)
                .authority(self.authority.clone())
                .path_and_query(pq)
                .build()
        });
        parts.uri = match uri {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(upstream = %self.target, path = %rewritten, error = %e, "Cannot build upstream URI");
                return plain_error(StatusCode::BAD_GATEWAY, "Upstream request failed");
            }
        };

        strip_hop_by_hop(&mut parts.headers);
        if let Some(addr) = client_addr {
            append_forwarded_for(&mut parts.headers, addr);
        }
        // The pooled client speaks HTTP/1.1 to backends whatever the client used.
        parts.version = Version::HTTP_11;

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => {
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::warn!(upstream = %self.target, error = %e, "Upstream error");
                plain_error(StatusCode::BAD_GATEWAY, "Upstream request failed")
            }
        }
    }
}

/// Join the target's path with the request path, and merge the queries.
pub fn rewrite_path_and_query(target: &Url, path: &str, query: Option<&str>) -> String {
    let path = single_joining_slash(target.path(), path);
    let target_query = target.query().unwrap_or("");
    let query = query.unwrap_or("");
    match (target_query.is_empty(), query.is_empty()) {
        (true, true) => path,
        (false, true) => format!("{path}?{target_query}"),
        (true, false) => format!("{path}?{query}"),
        (false, false) => format!("{path}?{target_query}&{query}"),
    }
}

fn single_joining_slash(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{a}{}", &b[1..]),
        (false, false) => format!("{a}/{b}"),
        _ => format!("{a}{b}"),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    for name in &listed {
        headers.remove(name.as_str());
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, addr: SocketAddr) {
    let ip = addr.ip().to_string();
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{prior}, {ip}"),
        None => ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
