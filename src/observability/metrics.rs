//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by outcome
//!   (`matched`, `not_found`, `error`)
//! - `router_dispatch_duration_seconds` (histogram): time spent resolving
//!   and running the controller
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exposition on a dedicated listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label for a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Matched,
    NotFound,
    Error,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch.
pub fn record_dispatch(outcome: DispatchOutcome, started: Instant) {
    metrics::counter!("router_dispatch_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("router_dispatch_duration_seconds", "outcome" => outcome.as_str())
        .record(started.elapsed().as_secs_f64());
}
