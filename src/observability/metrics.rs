//! Metrics collection.
//!
//! # Metrics
//! - `route_compile_passes_total` (counter): compilation passes by proxy kind
//! - `route_compile_resources_total` (counter): route resources emitted
//! - `route_compile_failed_chains_total` (counter): chains skipped with errors
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; exporter wiring is
//!   owned by the embedding process
//! - Labels are bounded (proxy kind), never per-chain

/// Record the outcome of one compilation pass.
pub fn record_compile_pass(kind: &str, resources: usize, failed_chains: usize) {
    metrics::counter!("route_compile_passes_total", "kind" => kind.to_string()).increment(1);
    metrics::counter!("route_compile_resources_total").increment(resources as u64);
    metrics::counter!("route_compile_failed_chains_total").increment(failed_chains as u64);
}
