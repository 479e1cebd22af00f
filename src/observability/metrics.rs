//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_ip_resolutions_total` (counter): resolutions by source
//!   (`header`, `transport`, `none`)
//! - `telemetry_requests_total` (counter): requests seen by the middleware

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one resolution. `None` means no IP could be determined.
pub fn record_resolution(source: Option<&'static str>) {
    ::metrics::counter!("client_ip_resolutions_total", "source" => source.unwrap_or("none"))
        .increment(1);
}

/// Count one request passing through the telemetry middleware.
pub fn record_request(method: &str) {
    ::metrics::counter!("telemetry_requests_total", "method" => method.to_string()).increment(1);
}
