//! End-to-end emission: supervisor, loops, submitter and a scripted sink

#![allow(clippy::unwrap_used, clippy::panic)]

use async_trait::async_trait;
use loadsim_engine::{
    CreateTimeSeriesRequest, EmissionConfig, Labels, MonitoredEntity, Readings, RetryPolicy, Sink,
    SinkError, SubmitConfig, Submitter, Supervisor,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Sink answering from a script, then with `fallback` once the script runs out
struct ScriptedSink {
    script: Mutex<VecDeque<Result<(), SinkError>>>,
    fallback: Result<(), SinkError>,
    requests: Mutex<Vec<CreateTimeSeriesRequest>>,
}

fn rejection() -> SinkError {
    SinkError::Rejected {
        code: "InvalidArgument".into(),
        message: "rejected".into(),
    }
}

impl ScriptedSink {
    fn succeeding() -> Arc<Self> {
        Self::with_script(Vec::new(), Ok(()))
    }

    fn always_rejecting() -> Arc<Self> {
        Self::with_script(Vec::new(), Err(rejection()))
    }

    /// Rejects the first `times` calls, accepts the rest
    fn rejecting(times: usize) -> Arc<Self> {
        Self::with_script((0..times).map(|_| Err(rejection())).collect(), Ok(()))
    }

    fn with_script(
        script: Vec<Result<(), SinkError>>,
        fallback: Result<(), SinkError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Sink for ScriptedSink {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn write(&self, request: &CreateTimeSeriesRequest) -> Result<(), SinkError> {
        self.requests.lock().push(request.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn health(&self) -> bool {
        true
    }
}

/// Volume with a replication, reporting fixed counters
struct Volume {
    name: String,
    labels: Labels,
    used: f64,
    size: f64,
    transfer: f64,
}

impl Volume {
    fn new(name: &str, used: f64, size: f64, transfer: f64) -> Arc<dyn MonitoredEntity> {
        Arc::new(Self {
            name: name.to_string(),
            labels: Labels::from([
                ("volume".to_string(), name.to_string()),
                ("datacenter".to_string(), "australia-southeast1".to_string()),
                ("cluster".to_string(), "cluster-01".to_string()),
            ]),
            used,
            size,
            transfer,
        })
    }
}

impl MonitoredEntity for Volume {
    fn id(&self) -> &str {
        &self.name
    }

    fn project_id(&self) -> &str {
        "z257c6412e15fa257-tp"
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn metric_labels(&self, metric: &str) -> Labels {
        match metric {
            "snapmirror_total_transfer_bytes" => {
                Labels::from([("relationship_id".to_string(), format!("{}-rel", self.name))])
            }
            _ => Labels::new(),
        }
    }

    fn samples(&self) -> Readings {
        Readings::from([
            ("volume_space_logical_used".to_string(), self.used),
            ("volume_capacity".to_string(), self.size),
            ("snapmirror_total_transfer_bytes".to_string(), self.transfer),
        ])
    }
}

fn submitter(sink: Arc<ScriptedSink>, max_attempts: u32, delay: Duration) -> Arc<Submitter> {
    Arc::new(Submitter::new(
        sink,
        SubmitConfig {
            retry: RetryPolicy::new(max_attempts, delay),
            ..SubmitConfig::default()
        },
    ))
}

fn emission(tick: Duration) -> EmissionConfig {
    EmissionConfig {
        max_batch_size: 5,
        tick_interval: tick,
        shutdown_grace: Duration::from_secs(10),
    }
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn single_volume_tick_sends_one_request_of_three_series() {
    let sink = ScriptedSink::succeeding();
    let supervisor = Supervisor::new(
        submitter(sink.clone(), 3, Duration::from_secs(2)),
        emission(Duration::from_secs(300)),
    );

    let handle = supervisor.start(vec![Volume::new("volume-1", 500.0, 1000.0, 200.0)]);
    settle().await;

    assert_eq!(sink.calls(), 1);
    let request = sink.requests.lock()[0].clone();
    assert_eq!(request.name, "projects/z257c6412e15fa257-tp");
    assert_eq!(request.time_series.len(), 3);

    for ts in &request.time_series {
        let metric = ts.metric.as_ref().unwrap();
        let value = ts.points[0].value.as_ref().unwrap().as_double().unwrap();
        match metric.r#type.as_str() {
            "custom.googleapis.com/snapmirror_total_transfer_bytes" => {
                assert_eq!(value, 200.0);
                assert_eq!(metric.labels.get("relationship_id").unwrap(), "volume-1-rel");
            }
            "custom.googleapis.com/volume_capacity" => {
                assert_eq!(value, 1000.0);
                assert!(!metric.labels.contains_key("relationship_id"));
            }
            "custom.googleapis.com/volume_space_logical_used" => {
                assert_eq!(value, 500.0);
                assert!(!metric.labels.contains_key("relationship_id"));
            }
            other => panic!("unexpected metric type {other}"),
        }
        assert_eq!(metric.labels.get("volume").unwrap(), "volume-1");
    }

    let report = handle.stop_and_wait().await;
    assert_eq!(report.stopped, 1);
    assert_eq!(report.ticks, 1);
}

#[tokio::test(start_paused = true)]
async fn always_rejecting_sink_exhausts_attempts_and_keeps_running() {
    let sink = ScriptedSink::always_rejecting();
    let submitter = submitter(sink.clone(), 3, Duration::ZERO);
    let supervisor = Supervisor::new(submitter.clone(), emission(Duration::from_secs(60)));

    let handle = supervisor.start(vec![Volume::new("volume-1", 500.0, 1000.0, 200.0)]);
    settle().await;

    assert_eq!(sink.calls(), 3);
    assert_eq!(submitter.retry_count(), 2);
    assert_eq!(submitter.exhausted_count(), 1);

    // Next tick happens regardless of the previous failure
    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(sink.calls(), 6);

    let report = handle.stop_and_wait().await;
    assert_eq!(report.ticks, 2);
    assert!(report.is_clean());
}

#[tokio::test(start_paused = true)]
async fn transient_failures_recover_within_the_tick() {
    let sink = ScriptedSink::rejecting(2);
    let submitter = submitter(sink.clone(), 3, Duration::from_secs(2));
    let supervisor = Supervisor::new(submitter.clone(), emission(Duration::from_secs(300)));

    let handle = supervisor.start(vec![Volume::new("volume-1", 1.0, 2.0, 0.0)]);

    // Attempts at 0s and 2s so far; the third waits for the second fixed delay
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(sink.calls(), 2);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(sink.calls(), 3);
    assert_eq!(submitter.recovered_count(), 1);
    assert_eq!(submitter.exhausted_count(), 0);

    let report = handle.stop_and_wait().await;
    assert_eq!(report.ticks, 1);
}

#[tokio::test(start_paused = true)]
async fn many_entities_each_get_their_own_loop() {
    let sink = ScriptedSink::succeeding();
    let supervisor = Supervisor::new(
        submitter(sink.clone(), 3, Duration::ZERO),
        emission(Duration::from_secs(300)),
    );

    let entities: Vec<Arc<dyn MonitoredEntity>> = (0..12)
        .map(|i| Volume::new(&format!("volume-{i}"), 0.0, 1.0, 0.0))
        .collect();
    let handle = supervisor.start(entities);
    settle().await;

    assert_eq!(handle.len(), 12);
    assert_eq!(sink.calls(), 12);

    let report = handle.stop_and_wait().await;
    assert_eq!(report.stopped, 12);
}

#[tokio::test(start_paused = true)]
async fn stop_returns_without_waiting_out_the_interval() {
    let sink = ScriptedSink::succeeding();
    let supervisor = Supervisor::new(
        submitter(sink.clone(), 3, Duration::ZERO),
        emission(Duration::from_secs(300)),
    );

    let handle = supervisor.start(vec![
        Volume::new("volume-1", 0.0, 1.0, 0.0),
        Volume::new("volume-2", 0.0, 1.0, 0.0),
    ]);
    settle().await;

    let before = Instant::now();
    let report = handle.stop_and_wait().await;

    assert_eq!(Instant::now(), before);
    assert_eq!(report.stopped, 2);
    assert!(report.abandoned.is_empty());
}
