//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by handler, status
//! - `gateway_request_duration_seconds` (histogram): time to response headers
//! - `gateway_proxy_instances_created_total` (counter): proxy cache misses that built a proxy
//! - `gateway_monitor_waits_total` (counter): long-poll waits by outcome
//!
//! Recording is a no-op until a recorder is installed, so tests never need one.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed dispatch. `handler` is "unmatched" when no route served it.
pub fn record_request(handler: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "handler" => handler,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "handler" => handler)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_proxy_created() {
    counter!("gateway_proxy_instances_created_total").increment(1);
}

pub fn record_monitor_wait(changed: bool) {
    let outcome = if changed { "changed" } else { "timeout" };
    counter!("gateway_monitor_waits_total", "outcome" => outcome).increment(1);
}
