//! Metrics collection and exposition.
//!
//! # Metrics
//! - `faucet_dispense_total` (counter): dispense attempts by outcome
//! - `faucet_fallback_total` (counter): default values substituted, by kind
//! - `faucet_balance_queries_total` (counter): balance lookups by outcome
//! - `faucet_rpc_errors_total` (counter): RPC calls that failed on every provider
//! - `faucet_next_nonce` (gauge): next nonce the allocator will hand out

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one dispense attempt.
pub fn record_dispense(outcome: &'static str) {
    counter!("faucet_dispense_total", "outcome" => outcome).increment(1);
}

/// Count one substituted default.
pub fn record_fallback(kind: &'static str) {
    counter!("faucet_fallback_total", "kind" => kind).increment(1);
}

/// Count one balance lookup.
pub fn record_balance_query(outcome: &'static str) {
    counter!("faucet_balance_queries_total", "outcome" => outcome).increment(1);
}

/// Count an RPC method that failed on every provider.
pub fn record_rpc_error(method: &'static str) {
    counter!("faucet_rpc_errors_total", "method" => method).increment(1);
}

/// Publish the allocator's next nonce.
pub fn record_next_nonce(nonce: u64) {
    gauge!("faucet_next_nonce").set(nonce as f64);
}
