//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_forward_total` (counter): forwards by service, outcome
//! - `gateway_forward_duration_seconds` (histogram): forward latency including retries
//! - `gateway_forward_attempts_total` (counter): individual attempts by service
//! - `gateway_forward_retries_total` (counter): backoff sleeps by service
//! - `gateway_health_checks_total` (counter): probes by service, result
//! - `gateway_service_health` (gauge): 1=healthy, 0=unhealthy at last probe
//! - `gateway_rpc_requests_total` (counter): JSON-RPC calls by method, code
//! - `gateway_registry_services` (gauge): registered services

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Label used in place of caller-supplied names that matched nothing.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Service label for a forward. Names that did not resolve are collapsed so
/// callers cannot mint new series.
pub fn forward_service_label<'a>(service: &'a str, outcome: &str) -> &'a str {
    if outcome == "not_found" {
        UNKNOWN_LABEL
    } else {
        service
    }
}

pub fn record_forward(service: &str, outcome: &'static str, start: Instant) {
    let service = forward_service_label(service, outcome).to_string();
    counter!("gateway_forward_total", "service" => service.clone(), "outcome" => outcome).increment(1);
    histogram!("gateway_forward_duration_seconds", "service" => service, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(service: &str) {
    counter!("gateway_forward_attempts_total", "service" => service.to_string()).increment(1);
}

pub fn record_retry(service: &str) {
    counter!("gateway_forward_retries_total", "service" => service.to_string()).increment(1);
}

pub fn record_health(service: &str, healthy: bool) {
    let result = if healthy { "healthy" } else { "unhealthy" };
    counter!("gateway_health_checks_total", "service" => service.to_string(), "result" => result).increment(1);
    gauge!("gateway_service_health", "service" => service.to_string()).set(if healthy { 1.0 } else { 0.0 });
}

/// `code` is 0 for successful calls. `method` is `None` for anything outside
/// the method table, including envelopes that never named one.
pub fn record_rpc(method: Option<&'static str>, code: i32) {
    counter!(
        "gateway_rpc_requests_total",
        "method" => method.unwrap_or(UNKNOWN_LABEL),
        "code" => code.to_string()
    )
    .increment(1);
}

pub fn record_registry_size(count: usize) {
    gauge!("gateway_registry_services").set(count as f64);
}
