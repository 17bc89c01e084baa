//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, errors, asset substitutions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, method, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_errors_total` (counter): failures by error kind
//! - `gateway_asset_substitutions_total` (counter): image references replaced, by route
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels for route, method, status code, error kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::gateway::error::ErrorKind;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished gateway request.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "route" => route.to_owned(),
        "method" => method.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_owned())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_error(kind: ErrorKind) {
    counter!("gateway_errors_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_asset_substitutions(route: &str, count: usize) {
    counter!("gateway_asset_substitutions_total", "route" => route.to_owned())
        .increment(count as u64);
}
