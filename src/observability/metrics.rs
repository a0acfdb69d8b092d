//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dessert_requests_total` (counter): requests by method, route, status
//! - `dessert_request_duration_seconds` (histogram): dispatch latency
//! - `dessert_bind_errors_total` (counter): argument bind failures by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_owned()),
        ("route", route.to_owned()),
        ("status", status.to_string()),
    ];
    metrics::counter!("dessert_requests_total", &labels).increment(1);
    metrics::histogram!("dessert_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_bind_error(route: &str) {
    metrics::counter!("dessert_bind_errors_total", "route" => route.to_owned()).increment(1);
}
