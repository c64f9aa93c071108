//! Metrics for transaction submission and account reads.
//!
//! Only the `metrics` facade is used here. Installing an exporter is left to
//! the embedding application.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Transaction submit-and-confirm latency metric name.
pub const METRIC_TX_SUBMIT_LATENCY: &str = "tx_submit_latency_ms";
/// Account fetch latency metric name.
pub const METRIC_ACCOUNT_FETCH_LATENCY: &str = "account_fetch_latency_ms";
/// Transactions submitted counter metric name.
pub const METRIC_TX_SUBMITTED: &str = "tx_submitted_total";
/// Transactions confirmed counter metric name.
pub const METRIC_TX_CONFIRMED: &str = "tx_confirmed_total";
/// Transactions failed counter metric name.
pub const METRIC_TX_FAILED: &str = "tx_failed_total";
/// Reads of accounts that do not exist.
pub const METRIC_READ_MISSES: &str = "account_read_misses_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_TX_SUBMIT_LATENCY,
        "Transaction submit-and-confirm latency in milliseconds"
    );
    describe_histogram!(
        METRIC_ACCOUNT_FETCH_LATENCY,
        "Account fetch latency in milliseconds"
    );

    describe_counter!(METRIC_TX_SUBMITTED, "Total number of transactions submitted");
    describe_counter!(METRIC_TX_CONFIRMED, "Total number of transactions confirmed");
    describe_counter!(
        METRIC_TX_FAILED,
        "Total number of transaction operations that failed"
    );
    describe_counter!(
        METRIC_READ_MISSES,
        "Total number of reads of accounts that do not exist"
    );

    debug!("Metrics initialized");
}

/// Record account fetch latency.
pub fn record_account_fetch_latency(start: Instant, kind: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_ACCOUNT_FETCH_LATENCY, "kind" => kind).record(latency_ms);
}

/// Increment transactions submitted counter.
pub fn inc_tx_submitted(operation: &'static str) {
    counter!(METRIC_TX_SUBMITTED, "operation" => operation).increment(1);
}

/// Increment transactions confirmed counter.
pub fn inc_tx_confirmed(operation: &'static str) {
    counter!(METRIC_TX_CONFIRMED, "operation" => operation).increment(1);
}

/// Increment transactions failed counter.
pub fn inc_tx_failed(operation: &'static str, kind: &'static str) {
    counter!(METRIC_TX_FAILED, "operation" => operation, "kind" => kind).increment(1);
}

/// Increment read misses counter.
pub fn inc_read_misses(kind: &'static str) {
    counter!(METRIC_READ_MISSES, "kind" => kind).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for transaction submission.
pub fn timer_tx_submit() -> LatencyTimer {
    LatencyTimer::new(METRIC_TX_SUBMIT_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("test_metric");
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        inc_tx_submitted("buy_outcome");
        inc_tx_failed("buy_outcome", "validation");
        record_account_fetch_latency(Instant::now(), "market");
    }
}
