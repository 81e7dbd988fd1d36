//! Prometheus metrics for application observability.
//!
//! Metrics are exported on a dedicated listener when `METRICS_PORT` is non-zero.
//! Without an installed exporter the recording functions are no-ops.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gateway_auth_failures_total` - Rejected credentials (label: reason = missing | invalid)
//! - `gateway_slow_requests_total` - Requests over the slow-request threshold
//! - `gateway_stream_events_total` - SSE events delivered
//!
//! ## Histograms
//! - `gateway_request_duration_seconds` - Request duration (labels: method, status)

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const AUTH_FAILURES_TOTAL: &str = "gateway_auth_failures_total";
    pub const SLOW_REQUESTS_TOTAL: &str = "gateway_slow_requests_total";
    pub const STREAM_EVENTS_TOTAL: &str = "gateway_stream_events_total";
    pub const REQUEST_DURATION_SECONDS: &str = "gateway_request_duration_seconds";
}

/// Initialize the Prometheus metrics exporter on `metrics_addr`.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::AUTH_FAILURES_TOTAL,
        "Total number of requests rejected by the auth guard"
    );
    describe_counter!(
        names::SLOW_REQUESTS_TOTAL,
        "Total number of requests slower than the configured threshold"
    );
    describe_counter!(
        names::STREAM_EVENTS_TOTAL,
        "Total number of server-sent events delivered"
    );
    describe_histogram!(
        names::REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

pub fn record_auth_failure(reason: &'static str) {
    counter!(names::AUTH_FAILURES_TOTAL, "reason" => reason).increment(1);
}

pub fn record_slow_request() {
    counter!(names::SLOW_REQUESTS_TOTAL).increment(1);
}

pub fn record_stream_event() {
    counter!(names::STREAM_EVENTS_TOTAL).increment(1);
}

/// Record HTTP request duration.
pub fn record_request_duration(method: &str, status: &str, duration_secs: f64) {
    histogram!(names::REQUEST_DURATION_SECONDS, "method" => method.to_string(), "status" => status.to_string())
        .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recording without an installed exporter must not panic.

    #[test]
    fn test_record_functions_without_exporter() {
        record_auth_failure("missing");
        record_slow_request();
        record_stream_event();
        record_request_duration("GET", "200", 0.1);
    }
}
