//! Prometheus metrics for loadsim
//!
//! The engine's own counters, separate from the synthetic telemetry it
//! emits. Recording is a no-op until [`Metrics::init`] has run, so library
//! users and tests that never initialize metrics pay nothing.

use crate::error::{EngineError, Result};
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, TextEncoder, register_counter,
    register_counter_vec, register_gauge, register_histogram,
};
use parking_lot::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics instance
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Held across the check and the registration in [`Metrics::init`]
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// All loadsim metrics
pub struct Metrics {
    // ─────────────────────────────────────────────────────────────────────────
    // Sample accounting
    // ─────────────────────────────────────────────────────────────────────────
    /// Samples the sink accepted
    pub samples_accepted: Counter,

    /// Samples given up on after all attempts
    pub samples_failed: Counter,

    /// Sink calls by outcome (ok / error)
    pub submit_attempts: CounterVec,

    /// Re-sends of a batch after a failed attempt
    pub batch_retries: Counter,

    // ─────────────────────────────────────────────────────────────────────────
    // Emission loops
    // ─────────────────────────────────────────────────────────────────────────
    /// Completed ticks across all loops
    pub ticks: Counter,

    /// Wall time of one tick, sink calls and delays included
    pub tick_duration_seconds: Histogram,

    /// Emission loops currently running
    pub active_loops: Gauge,

    // ─────────────────────────────────────────────────────────────────────────
    // Provisioning
    // ─────────────────────────────────────────────────────────────────────────
    /// Records that could not be deleted at shutdown (by kind)
    pub teardown_failures: CounterVec,
}

impl Metrics {
    /// Initialize metrics (call once at startup)
    ///
    /// Safe to call concurrently and repeatedly: registration runs once and
    /// every caller gets the same instance. Returns error if metric
    /// registration fails.
    #[allow(clippy::result_large_err)]
    pub fn init() -> Result<&'static Metrics> {
        if let Some(metrics) = METRICS.get() {
            return Ok(metrics);
        }

        let _guard = INIT_LOCK.lock();
        if let Some(metrics) = METRICS.get() {
            return Ok(metrics);
        }

        let metrics = Metrics {
            samples_accepted: register_counter!(
                "loadsim_samples_accepted_total",
                "Total samples accepted by the sink"
            )
            .map_err(|e| EngineError::Metrics(format!("samples_accepted: {e}")))?,

            samples_failed: register_counter!(
                "loadsim_samples_failed_total",
                "Total samples that failed after all attempts"
            )
            .map_err(|e| EngineError::Metrics(format!("samples_failed: {e}")))?,

            submit_attempts: register_counter_vec!(
                "loadsim_submit_attempts_total",
                "Sink calls by outcome",
                &["outcome"]
            )
            .map_err(|e| EngineError::Metrics(format!("submit_attempts: {e}")))?,

            batch_retries: register_counter!(
                "loadsim_batch_retries_total",
                "Total batch re-sends after a failed attempt"
            )
            .map_err(|e| EngineError::Metrics(format!("batch_retries: {e}")))?,

            ticks: register_counter!("loadsim_ticks_total", "Total completed emission ticks")
                .map_err(|e| EngineError::Metrics(format!("ticks: {e}")))?,

            tick_duration_seconds: register_histogram!(
                "loadsim_tick_duration_seconds",
                "Time spent in one emission tick",
                // Buckets: 10ms to 2min (retries dominate the tail)
                vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
            )
            .map_err(|e| EngineError::Metrics(format!("tick_duration_seconds: {e}")))?,

            active_loops: register_gauge!(
                "loadsim_active_loops",
                "Number of running emission loops"
            )
            .map_err(|e| EngineError::Metrics(format!("active_loops: {e}")))?,

            teardown_failures: register_counter_vec!(
                "loadsim_teardown_failures_total",
                "Records that could not be deleted at shutdown",
                &["kind"]
            )
            .map_err(|e| EngineError::Metrics(format!("teardown_failures: {e}")))?,
        };

        // Only this caller can reach here while METRICS is empty
        let _ = METRICS.set(metrics);

        METRICS
            .get()
            .ok_or_else(|| EngineError::Metrics("Failed to initialize metrics".to_string()))
    }

    /// Get the global metrics instance
    ///
    /// Returns None if metrics haven't been initialized yet.
    pub fn get() -> Option<&'static Metrics> {
        METRICS.get()
    }

    /// Record one sink call
    pub fn record_attempt(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.submit_attempts.with_label_values(&[outcome]).inc();
    }

    /// Record a finished tick
    pub fn record_tick(&self, accepted: u64, failed: u64, duration: Duration) {
        self.ticks.inc();
        self.samples_accepted.inc_by(accepted as f64);
        self.samples_failed.inc_by(failed as f64);
        self.tick_duration_seconds.observe(duration.as_secs_f64());
    }
}

/// Gather all metrics and encode as Prometheus text format
///
/// Returns the metrics as a String, ready to be served via HTTP.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_ok() {
        String::from_utf8(buffer).unwrap_or_default()
    } else {
        String::new()
    }
}

/// Record a sink call if metrics are initialized
pub fn try_record_attempt(ok: bool) {
    if let Some(m) = Metrics::get() {
        m.record_attempt(ok);
    }
}

/// Record a batch re-send if metrics are initialized
pub fn try_record_retry() {
    if let Some(m) = Metrics::get() {
        m.batch_retries.inc();
    }
}

/// Record a finished tick if metrics are initialized
pub fn try_record_tick(accepted: u64, failed: u64, duration: Duration) {
    if let Some(m) = Metrics::get() {
        m.record_tick(accepted, failed, duration);
    }
}

/// Adjust the running-loop gauge if metrics are initialized
pub fn try_adjust_active_loops(delta: f64) {
    if let Some(m) = Metrics::get() {
        m.active_loops.add(delta);
    }
}

/// Record a failed teardown deletion if metrics are initialized
pub fn try_record_teardown_failure(kind: &str) {
    if let Some(m) = Metrics::get() {
        m.teardown_failures.with_label_values(&[kind]).inc();
    }
}
