//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_api_requests_total` (counter): requests by method, status
//! - `contact_api_request_duration_seconds` (histogram): latency by method
//! - `contact_api_mutations_total` (counter): store writes by operation, outcome
//! - `contact_api_contacts` (gauge): number of stored contacts

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint. Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "contact_api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("contact_api_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_mutation(operation: &'static str, outcome: &'static str) {
    counter!(
        "contact_api_mutations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_store_size(size: usize) {
    gauge!("contact_api_contacts").set(size as f64);
}
