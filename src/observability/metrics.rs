//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): relayed requests by method, status
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_precise_amount_conversions_total` (counter): transformer outcomes
//!
//! # Design Decisions
//! - Prometheus exporter runs its own listener, separate from traffic
//! - Unchanged bodies are not counted; only attempted conversions are

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::transform::{Outcome, TransformError};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a transformer outcome.
pub fn record_conversion(outcome: &Outcome) {
    if let Some(label) = conversion_label(outcome) {
        metrics::counter!("proxy_precise_amount_conversions_total", "outcome" => label)
            .increment(1);
    }
}

fn conversion_label(outcome: &Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Unchanged => None,
        Outcome::Converted { .. } => Some("converted"),
        Outcome::Failed(TransformError::InvalidPreciseAmount { .. }) => Some("invalid"),
        Outcome::Failed(TransformError::Json(_)) => Some("json_error"),
    }
}
