//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_cache_reloads_total` (counter): documents read from storage
//! - `config_cache_decodes_total` (counter): typed decodes performed
//! - `config_cache_updates_total` (counter): documents written
//! - `config_cache_requests_total` (counter): HTTP requests by endpoint, status

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_reload() {
    counter!("config_cache_reloads_total").increment(1);
}

pub fn record_decode() {
    counter!("config_cache_decodes_total").increment(1);
}

pub fn record_update() {
    counter!("config_cache_updates_total").increment(1);
}

/// Count a handled HTTP request.
pub fn record_request(endpoint: &'static str, status: u16) {
    counter!(
        "config_cache_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}
