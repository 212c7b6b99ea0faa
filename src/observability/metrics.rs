//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_clients_connected` (gauge): currently registered clients
//! - `bridge_connections_total` (counter): clients ever registered
//! - `bridge_lines_dropped_total` (counter): lines dropped on a full slot
//! - `bridge_exchanges_total` (counter): exchanges by `outcome`
//! - `bridge_exchange_duration_seconds` (histogram): exchange latency by `outcome`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn client_connected() {
    metrics::counter!("bridge_connections_total").increment(1);
    metrics::gauge!("bridge_clients_connected").increment(1.0);
}

pub fn client_disconnected() {
    metrics::gauge!("bridge_clients_connected").decrement(1.0);
}

pub fn line_dropped() {
    metrics::counter!("bridge_lines_dropped_total").increment(1);
}

pub fn record_exchange(outcome: &'static str, started: Instant) {
    metrics::counter!("bridge_exchanges_total", "outcome" => outcome).increment(1);
    metrics::histogram!("bridge_exchange_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}
