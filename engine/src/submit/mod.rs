//! Batch submission with bounded fixed-delay retry
//!
//! A batch is all-or-nothing: either one attempt succeeds and every sample in
//! it counts as accepted, or every attempt fails and every sample counts as
//! failed. Failures never propagate as errors past this module.

mod encode;
mod retry;

pub use encode::{Encoder, ResourceDescriptor};
pub use retry::RetryPolicy;

use crate::batch::Batch;
use crate::config::SubmitConfig;
use crate::metrics;
use loadsim_core::Sink;
use std::ops::AddAssign;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// Accepted and failed sample counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub accepted: u64,
    pub failed: u64,
}

impl SubmissionOutcome {
    pub fn accepted(count: usize) -> Self {
        Self {
            accepted: count as u64,
            failed: 0,
        }
    }

    pub fn failed(count: usize) -> Self {
        Self {
            accepted: 0,
            failed: count as u64,
        }
    }

    pub fn total(&self) -> u64 {
        self.accepted + self.failed
    }
}

impl AddAssign for SubmissionOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.accepted += rhs.accepted;
        self.failed += rhs.failed;
    }
}

/// Sends batches to a sink, retrying each one a bounded number of times
///
/// Shared by every emission loop behind an `Arc`.
pub struct Submitter {
    sink: Arc<dyn Sink>,
    encoder: Encoder,
    policy: RetryPolicy,
    batch_pacing: Duration,
    /// Re-sends after a failed attempt
    retry_count: AtomicU64,
    /// Batches that succeeded after at least one failure
    recovered_count: AtomicU64,
    /// Batches that failed every attempt
    exhausted_count: AtomicU64,
}

impl Submitter {
    pub fn new(sink: Arc<dyn Sink>, config: SubmitConfig) -> Self {
        Self {
            sink,
            encoder: Encoder::new(config.metric_prefix, config.resource),
            policy: config.retry,
            batch_pacing: config.batch_pacing,
            retry_count: AtomicU64::new(0),
            recovered_count: AtomicU64::new(0),
            exhausted_count: AtomicU64::new(0),
        }
    }

    /// Submitter with default settings
    pub fn with_defaults(sink: Arc<dyn Sink>) -> Self {
        Self::new(sink, SubmitConfig::default())
    }

    /// Name of the underlying sink
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Total re-sends after a failed attempt
    pub fn retry_count(&self) -> u64 {
        self.retry_count.load(Ordering::Relaxed)
    }

    /// Batches that succeeded after at least one failure
    pub fn recovered_count(&self) -> u64 {
        self.recovered_count.load(Ordering::Relaxed)
    }

    /// Batches that failed every attempt
    pub fn exhausted_count(&self) -> u64 {
        self.exhausted_count.load(Ordering::Relaxed)
    }

    /// Submit one batch for `project_id`
    ///
    /// The request is built once and resent unchanged on retry.
    pub async fn submit(&self, project_id: &str, batch: &Batch) -> SubmissionOutcome {
        if batch.is_empty() {
            return SubmissionOutcome::default();
        }

        let request = self.encoder.encode(project_id, batch, SystemTime::now());
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.sink.write(&request).await {
                Ok(()) => {
                    metrics::try_record_attempt(true);
                    if attempt > 1 {
                        self.recovered_count.fetch_add(1, Ordering::Relaxed);
                        tracing::info!(
                            sink = self.sink.name(),
                            batch = batch.number(),
                            attempt = attempt,
                            "batch recovered after retry"
                        );
                    }
                    return SubmissionOutcome::accepted(batch.len());
                }
                Err(e) => {
                    metrics::try_record_attempt(false);
                    match self.policy.delay_after(attempt) {
                        Some(delay) => {
                            self.retry_count.fetch_add(1, Ordering::Relaxed);
                            metrics::try_record_retry();
                            tracing::warn!(
                                sink = self.sink.name(),
                                project_id = project_id,
                                error = %e,
                                "Batch {} failed (attempt {}/{}), retrying in {:?}",
                                batch.number(),
                                attempt,
                                max_attempts,
                                delay
                            );
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                        None => {
                            tracing::error!(
                                sink = self.sink.name(),
                                project_id = project_id,
                                error = %e,
                                "Batch {} failed after {} attempts",
                                batch.number(),
                                max_attempts
                            );
                        }
                    }
                }
            }
        }

        self.exhausted_count.fetch_add(1, Ordering::Relaxed);
        SubmissionOutcome::failed(batch.len())
    }

    /// Submit every batch of one tick in order, pacing between batches
    pub async fn submit_all(&self, project_id: &str, batches: &[Batch]) -> SubmissionOutcome {
        let mut outcome = SubmissionOutcome::default();

        for (i, batch) in batches.iter().enumerate() {
            if i > 0 && !self.batch_pacing.is_zero() {
                tokio::time::sleep(self.batch_pacing).await;
            }
            outcome += self.submit(project_id, batch).await;
        }

        outcome
    }
}
