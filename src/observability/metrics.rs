//! Metrics collection and exposition.
//!
//! # Metrics
//! - `endpoint_starts_total` (counter): bring-ups by result (`ok`, `descriptor`, `injection`, `handlers`)
//! - `endpoint_stops_total` (counter): completed teardowns
//! - `endpoint_teardown_faults_total` (counter): non-fatal teardown faults by step
//! - `endpoints_active` (gauge): endpoints currently serving
//! - `endpoint_invocations_total` (counter): invocations by port and outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests never install one)
//! - The Prometheus exporter is opt-in via config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_start(result: &'static str) {
    counter!("endpoint_starts_total", "result" => result).increment(1);
    if result == "ok" {
        gauge!("endpoints_active").increment(1.0);
    }
}

pub fn record_stop() {
    counter!("endpoint_stops_total").increment(1);
    gauge!("endpoints_active").decrement(1.0);
}

pub fn record_teardown_fault(step: &'static str) {
    counter!("endpoint_teardown_faults_total", "step" => step).increment(1);
}

pub fn record_invocation(port_id: &str, outcome: &'static str) {
    counter!("endpoint_invocations_total", "port_id" => port_id.to_string(), "outcome" => outcome).increment(1);
}
