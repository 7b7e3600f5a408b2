//! Starts one emission loop per entity and stops them together

use super::task::EmissionLoop;
use crate::config::EmissionConfig;
use crate::metrics;
use crate::submit::Submitter;
use loadsim_core::MonitoredEntity;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// Spawns emission loops sharing one submitter and one cancellation signal
pub struct Supervisor {
    submitter: Arc<Submitter>,
    config: EmissionConfig,
}

impl Supervisor {
    pub fn new(submitter: Arc<Submitter>, config: EmissionConfig) -> Self {
        Self { submitter, config }
    }

    /// Spawn one loop per entity
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, entities: Vec<Arc<dyn MonitoredEntity>>) -> SupervisorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let loops: Vec<LoopHandle> = entities
            .into_iter()
            .map(|entity| {
                let entity_id = entity.id().to_string();
                let emission =
                    EmissionLoop::new(entity, Arc::clone(&self.submitter), shutdown_rx.clone())
                        .max_batch_size(self.config.max_batch_size)
                        .tick_interval(self.config.tick_interval);

                let handle = tokio::spawn(async move {
                    let _active = ActiveLoop::enter();
                    emission.run().await
                });

                LoopHandle { entity_id, handle }
            })
            .collect();

        info!(
            loops = loops.len(),
            sink = self.submitter.sink_name(),
            tick_secs = self.config.tick_interval.as_secs(),
            "emission loops started"
        );

        SupervisorHandle {
            shutdown_tx,
            loops,
            grace: self.config.shutdown_grace,
        }
    }
}

struct LoopHandle {
    entity_id: String,
    handle: JoinHandle<u64>,
}

/// Keeps the active-loop gauge in step with running loops, abort included
struct ActiveLoop;

impl ActiveLoop {
    fn enter() -> Self {
        metrics::try_adjust_active_loops(1.0);
        ActiveLoop
    }
}

impl Drop for ActiveLoop {
    fn drop(&mut self) {
        metrics::try_adjust_active_loops(-1.0);
    }
}

/// How the loops ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Loops that observed cancellation and returned
    pub stopped: usize,
    /// Loops that panicked
    pub panicked: usize,
    /// Entities whose loop outlived the grace period and was aborted
    pub abandoned: Vec<String>,
    /// Ticks completed across stopped loops
    pub ticks: u64,
}

impl StopReport {
    /// Every loop returned on its own
    pub fn is_clean(&self) -> bool {
        self.panicked == 0 && self.abandoned.is_empty()
    }
}

/// Handle to a running set of emission loops
pub struct SupervisorHandle {
    shutdown_tx: watch::Sender<bool>,
    loops: Vec<LoopHandle>,
    grace: Duration,
}

impl SupervisorHandle {
    /// Number of loops started
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Broadcast cancellation without waiting
    pub fn cancel(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Cancel every loop and wait for them, up to the grace period
    ///
    /// Loops still running at the deadline (typically stuck in a sink call)
    /// are aborted and reported as abandoned.
    pub async fn stop_and_wait(self) -> StopReport {
        self.cancel();

        let mut report = StopReport::default();
        if self.loops.is_empty() {
            return report;
        }

        let deadline = Instant::now() + self.grace;

        for LoopHandle {
            entity_id,
            mut handle,
        } in self.loops
        {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(ticks)) => {
                    report.stopped += 1;
                    report.ticks += ticks;
                }
                Ok(Err(e)) if e.is_panic() => {
                    warn!(entity = %entity_id, "emission loop panicked");
                    report.panicked += 1;
                }
                Ok(Err(_)) => {
                    // Cancelled from outside; nothing left running
                    report.stopped += 1;
                }
                Err(_) => {
                    handle.abort();
                    warn!(
                        entity = %entity_id,
                        grace_ms = self.grace.as_millis() as u64,
                        "emission loop did not stop in time, aborted"
                    );
                    report.abandoned.push(entity_id);
                }
            }
        }

        info!(
            stopped = report.stopped,
            panicked = report.panicked,
            abandoned = report.abandoned.len(),
            ticks = report.ticks,
            "emission loops stopped"
        );

        report
    }
}
