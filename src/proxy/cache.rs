//! Lazily built, per-route reverse proxies.
//!
//! # Design Decisions
//! - One map behind one mutex, held only for lookup and insert
//! - Proxies are built outside the lock; two racing first requests may both
//!   build one, but only the first stored instance is ever handed out
//! - Bad targets are not cached, every request re-parses and fails the same way

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

use crate::config::HandlerKind;
use crate::http::response::bad_configuration;
use crate::observability::metrics;
use crate::proxy::reverse::{ProxyError, ReverseProxy};
use crate::routing::{Outcome, Route, RouteId};

/// Memoizes one `ReverseProxy` per proxy route.
#[derive(Debug)]
pub struct ProxyCache {
    client: Client<HttpConnector, Body>,
    proxies: Mutex<HashMap<RouteId, Arc<ReverseProxy>>>,
}

impl ProxyCache {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            proxies: Mutex::new(HashMap::new()),
        }
    }

    /// The proxy for `route`, built on first use. `None` if the route is not a
    /// proxy route or its target is unusable.
    pub fn proxy_for_route(&self, route: &Route) -> Option<Arc<ReverseProxy>> {
        if route.handler != HandlerKind::Proxy {
            return None;
        }

        let cached = self.lock().get(&route.id).cloned();
        if cached.is_some() {
            return cached;
        }

        let target = route.target.as_deref()?;
        let built = Url::parse(target)
            .map_err(ProxyError::from)
            .and_then(|url| ReverseProxy::new(url, self.client.clone()));
        let proxy = match built {
            Ok(proxy) => Arc::new(proxy),
            Err(e) => {
                tracing::error!(route = %route.id, upstream = %target, error = %e, "Invalid proxy target");
                return None;
            }
        };
        metrics::record_proxy_created();
        tracing::debug!(route = %route.id, upstream = %proxy.target(), "Proxy created");

        let mut proxies = self.lock();
        Some(proxies.entry(route.id).or_insert(proxy).clone())
    }

    /// Forward `request` through the route's proxy.
    ///
    /// Declines only if the route has no target at all.
    pub async fn serve(&self, route: &Route, request: Request<Body>) -> Outcome {
        let Some(target) = route.target.as_deref() else {
            return Outcome::Declined(request);
        };
        tracing::debug!(path = %request.uri().path(), upstream = %target, "[proxy]");

        let Some(proxy) = self.proxy_for_route(route) else {
            return Outcome::Handled(bad_configuration());
        };
        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Outcome::Handled(proxy.forward(request, client_addr).await)
    }

    /// Number of proxies built so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RouteId, Arc<ReverseProxy>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.proxies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProxyCache {
    fn default() -> Self {
        Self::new()
    }
}
