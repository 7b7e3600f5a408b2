//! Per-entity emission loop

use crate::batch::entity_batches;
use crate::metrics;
use crate::submit::{SubmissionOutcome, Submitter};
use loadsim_core::MonitoredEntity;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

/// Reports on one entity at a fixed cadence until cancelled
///
/// # Example
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
/// let emission = EmissionLoop::new(entity, submitter, shutdown_rx)
///     .max_batch_size(5)
///     .tick_interval(Duration::from_secs(300));
/// let handle = tokio::spawn(emission.run());
/// ```
pub struct EmissionLoop {
    entity: Arc<dyn MonitoredEntity>,
    submitter: Arc<Submitter>,
    max_batch_size: usize,
    tick_interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
    /// Completed ticks, for log correlation
    ticks: u64,
}

impl EmissionLoop {
    pub fn new(
        entity: Arc<dyn MonitoredEntity>,
        submitter: Arc<Submitter>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            entity,
            submitter,
            max_batch_size: 5,
            tick_interval: Duration::from_secs(300),
            shutdown_rx,
            ticks: 0,
        }
    }

    /// Samples per submission call (default: 5)
    pub fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Sleep between ticks (default: 5 minutes)
    pub fn tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn entity_id(&self) -> &str {
        self.entity.id()
    }

    /// Run until cancelled and return the number of completed ticks
    ///
    /// Cancellation is checked before each tick and during the sleep after
    /// it. A tick that has started runs to completion, retries included.
    pub async fn run(mut self) -> u64 {
        debug!(
            entity = %self.entity.id(),
            tick_secs = self.tick_interval.as_secs(),
            "emission loop started"
        );

        loop {
            if self.is_cancelled() {
                break;
            }

            self.tick().await;

            if self.sleep_or_cancel().await {
                break;
            }
        }

        debug!(entity = %self.entity.id(), ticks = self.ticks, "emission loop stopped");
        self.ticks
    }

    /// Read, batch and submit the entity's current samples once
    pub async fn tick(&mut self) -> SubmissionOutcome {
        let started = Instant::now();
        let batches = entity_batches(self.entity.as_ref(), self.max_batch_size);
        let outcome = self
            .submitter
            .submit_all(self.entity.project_id(), &batches)
            .await;
        self.ticks += 1;

        info!(
            entity = %self.entity.id(),
            tick = self.ticks,
            batches = batches.len(),
            "[{}] Metrics push completed - Success: {}, Failed: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            outcome.accepted,
            outcome.failed
        );
        metrics::try_record_tick(outcome.accepted, outcome.failed, started.elapsed());

        outcome
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Sleep one tick interval; `true` if cancellation arrived first
    ///
    /// A dropped sender counts as cancellation.
    async fn sleep_or_cancel(&mut self) -> bool {
        let sleep = tokio::time::sleep(self.tick_interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        return true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SubmitConfig;
    use crate::submit::RetryPolicy;
    use async_trait::async_trait;
    use loadsim_core::{CreateTimeSeriesRequest, Labels, Readings, Sink, SinkError};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct RecordingSink {
        fail: AtomicBool,
        calls: AtomicU32,
        requests: Mutex<Vec<CreateTimeSeriesRequest>>,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Self {
            Self {
                fail: AtomicBool::new(fail),
                calls: AtomicU32::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Sink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn write(&self, request: &CreateTimeSeriesRequest) -> Result<(), SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request.clone());
            if self.fail.load(Ordering::SeqCst) {
                Err(SinkError::Rejected {
                    code: "Internal".into(),
                    message: "always".into(),
                })
            } else {
                Ok(())
            }
        }

        async fn health(&self) -> bool {
            true
        }
    }

    struct Volume;

    impl MonitoredEntity for Volume {
        fn id(&self) -> &str {
            "volume-1"
        }

        fn project_id(&self) -> &str {
            "tp-1"
        }

        fn labels(&self) -> &Labels {
            static LABELS: std::sync::OnceLock<Labels> = std::sync::OnceLock::new();
            LABELS.get_or_init(|| Labels::from([("volume".to_string(), "volume-1".to_string())]))
        }

        fn samples(&self) -> Readings {
            Readings::from([
                ("volume_space_logical_used".to_string(), 500.0),
                ("volume_capacity".to_string(), 1000.0),
                ("snapmirror_total_transfer_bytes".to_string(), 200.0),
            ])
        }
    }

    fn submitter(sink: Arc<RecordingSink>) -> Arc<Submitter> {
        Arc::new(Submitter::new(
            sink,
            SubmitConfig {
                retry: RetryPolicy::new(3, Duration::ZERO),
                batch_pacing: Duration::ZERO,
                ..SubmitConfig::default()
            },
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_submits_one_batch() {
        let sink = Arc::new(RecordingSink::new(false));
        let (_tx, rx) = watch::channel(false);
        let mut emission = EmissionLoop::new(Arc::new(Volume), submitter(sink.clone()), rx);

        let outcome = emission.tick().await;

        assert_eq!(outcome.accepted, 3);
        assert_eq!(outcome.failed, 0);
        assert_eq!(sink.calls(), 1);
        assert_eq!(sink.requests.lock()[0].name, "projects/tp-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_counts_failures_without_erroring() {
        let sink = Arc::new(RecordingSink::new(true));
        let (_tx, rx) = watch::channel(false);
        let mut emission = EmissionLoop::new(Arc::new(Volume), submitter(sink.clone()), rx);

        let outcome = emission.tick().await;

        assert_eq!(outcome.accepted, 0);
        assert_eq!(outcome.failed, 3);
        assert_eq!(sink.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_runs_no_tick() {
        let sink = Arc::new(RecordingSink::new(false));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let ticks = EmissionLoop::new(Arc::new(Volume), submitter(sink.clone()), rx)
            .run()
            .await;

        assert_eq!(ticks, 0);
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let sink = Arc::new(RecordingSink::new(false));
        let (tx, rx) = watch::channel(false);
        let emission = EmissionLoop::new(Arc::new(Volume), submitter(sink.clone()), rx)
            .tick_interval(Duration::from_secs(300));

        let handle = tokio::spawn(emission.run());

        // Let the first tick finish and the loop reach its sleep
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(sink.calls(), 1);

        let before = Instant::now();
        tx.send(true).unwrap();
        let ticks = handle.await.unwrap();

        assert_eq!(ticks, 1);
        assert_eq!(Instant::now(), before, "loop must not wait out the interval");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_repeat_at_interval() {
        let sink = Arc::new(RecordingSink::new(true));
        let (tx, rx) = watch::channel(false);
        let emission = EmissionLoop::new(Arc::new(Volume), submitter(sink.clone()), rx)
            .tick_interval(Duration::from_secs(60));

        let handle = tokio::spawn(emission.run());

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(61)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Failing sink: two ticks of three attempts each, loop still alive
        assert_eq!(sink.calls(), 6);
        assert!(!handle.is_finished());

        tx.send(true).unwrap();
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_loop() {
        let sink = Arc::new(RecordingSink::new(false));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(EmissionLoop::new(Arc::new(Volume), submitter(sink), rx).run());

        tokio::task::yield_now().await;
        drop(tx);

        assert_eq!(handle.await.unwrap(), 1);
    }
}
