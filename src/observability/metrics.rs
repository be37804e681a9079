//! Router metrics.
//!
//! # Metrics
//! - `replica_router_reads_total` (counter): pooled reads by serving connection
//! - `replica_router_read_retries_total` (counter): retries by outcome
//! - `replica_router_suppressions_total` (counter): exclusions by connection
//! - `replica_router_reinstatements_total` (counter): reinstatement attempts
//! - `replica_router_fan_out_failures_total` (counter): swallowed replica errors
//! - `replica_router_available_connections` (gauge): size of the live rotation

pub fn record_read(connection: &str) {
    ::metrics::counter!("replica_router_reads_total", "connection" => connection.to_string()).increment(1);
}

pub fn record_retry(outcome: &'static str) {
    ::metrics::counter!("replica_router_read_retries_total", "outcome" => outcome).increment(1);
}

pub fn record_suppression(connection: &str) {
    ::metrics::counter!("replica_router_suppressions_total", "connection" => connection.to_string()).increment(1);
}

pub fn record_reinstatement(connection: &str, success: bool) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "replica_router_reinstatements_total",
        "connection" => connection.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_fan_out_failure(connection: &str) {
    ::metrics::counter!("replica_router_fan_out_failures_total", "connection" => connection.to_string()).increment(1);
}

pub fn record_available_connections(count: usize) {
    ::metrics::gauge!("replica_router_available_connections").set(count as f64);
}
