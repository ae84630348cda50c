//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics and the state source
//! - Report route target defects
//! - Bind the listener and serve until a signal arrives
//! - Bound the drain so held long-polls cannot stall exit
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::validation::route_warnings;
use crate::config::{GatewayConfig, MonitorConfig};
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::monitor::{FileEpochSource, StateSource, WatchStateSource};
use crate::observability::metrics;

/// How long in-flight requests get after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Pick the state source the monitor routes read from.
pub fn state_source(config: &MonitorConfig) -> Result<Arc<dyn StateSource>, GatewayError> {
    match config.epoch_file.as_deref() {
        Some(path) => Ok(Arc::new(FileEpochSource::start(Path::new(path))?)),
        None => {
            tracing::info!("No epoch file configured, monitor epoch stays unknown");
            Ok(Arc::new(WatchStateSource::new()))
        }
    }
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), GatewayError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| GatewayError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    for warning in route_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    let source = state_source(&config.monitor)?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| GatewayError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, source);
    let mut task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut task => return Ok(result??),
        _ = signals::wait_for_signal() => {}
    }

    shutdown.trigger();
    match tokio::time::timeout(DRAIN_TIMEOUT, &mut task).await {
        Ok(result) => Ok(result??),
        Err(_) => {
            tracing::warn!(timeout = ?DRAIN_TIMEOUT, "Drain deadline passed, dropping open connections");
            task.abort();
            Ok(())
        }
    }
}
