//! Metrics collection.
//!
//! # Responsibilities
//! - Define link metrics (connects, reconnects, retries, throughput)
//! - Record them through the `metrics` facade
//!
//! # Metrics
//! - `rewire_connects_total` (counter): successful dials
//! - `rewire_connect_failures_total` (counter): failed dials
//! - `rewire_reconnects_total` (counter): live sockets replaced as unusable
//! - `rewire_retries_total` (counter, by operation): backoff sleeps taken
//! - `rewire_retries_exhausted_total` (counter, by operation): budgets spent
//! - `rewire_bytes_written_total` / `rewire_bytes_read_total` (counters)
//!
//! # Design Decisions
//! - Recording is cheap counter increments; installing a recorder/exporter
//!   is left entirely to the embedding application

use metrics::counter;

/// Record a successful dial.
pub fn record_connect() {
    counter!("rewire_connects_total").increment(1);
}

/// Record a dial that failed.
pub fn record_connect_failure() {
    counter!("rewire_connect_failures_total").increment(1);
}

/// Record a live socket being replaced because it was unusable.
pub fn record_reconnect() {
    counter!("rewire_reconnects_total").increment(1);
}

/// Record one backoff sleep before re-attempting `operation`.
pub fn record_retry(operation: &'static str) {
    counter!("rewire_retries_total", "operation" => operation).increment(1);
}

/// Record an operation giving up with its retry budget spent.
pub fn record_retry_exhausted(operation: &'static str) {
    counter!("rewire_retries_exhausted_total", "operation" => operation).increment(1);
}

/// Record payload bytes fully handed to the socket.
pub fn record_bytes_written(count: usize) {
    counter!("rewire_bytes_written_total").increment(count as u64);
}

/// Record payload bytes received from the socket.
pub fn record_bytes_read(count: usize) {
    counter!("rewire_bytes_read_total").increment(count as u64);
}
