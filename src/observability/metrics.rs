//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): adapted requests by method, outcome
//! - `bridge_request_duration_seconds` (histogram): time from arrival to dispatch
//! - `bridge_body_bytes` (histogram): size of buffered bodies
//! - `bridge_rejections_total` (counter): failed adaptations by reason
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so tests need no setup
//! - Prometheus exporter runs its own listener

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &Method, outcome: &'static str, started: Instant) {
    counter!(
        "bridge_requests_total",
        "method" => method_label(method),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("bridge_request_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Standard methods by name; extension methods share one label.
fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        Method::PATCH => "PATCH",
        Method::CONNECT => "CONNECT",
        Method::TRACE => "TRACE",
        _ => "OTHER",
    }
}

pub fn record_body_bytes(len: usize) {
    histogram!("bridge_body_bytes").record(len as f64);
}

pub fn record_rejection(reason: &'static str) {
    counter!("bridge_rejections_total", "reason" => reason).increment(1);
}
