//! Monitored entities and the samples read from them

use std::collections::BTreeMap;

/// Label set attached to a time series (label name → value)
///
/// Ordered so that encoded requests and log output are deterministic.
pub type Labels = BTreeMap<String, String>;

/// Readings for one entity at one instant (metric name → value)
///
/// Iteration order is lexicographic by metric name, which is the order the
/// batcher partitions in.
pub type Readings = BTreeMap<String, f64>;

/// A single reading tagged with the full label set it is submitted under
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric name without the type prefix (e.g. `volume_capacity`)
    pub metric: String,
    /// Current value
    pub value: f64,
    /// Entity base labels plus any metric-specific labels
    pub labels: Labels,
}

impl Sample {
    pub fn new(metric: impl Into<String>, value: f64, labels: Labels) -> Self {
        Self {
            metric: metric.into(),
            value,
            labels,
        }
    }
}

/// Something the engine emits telemetry for
///
/// Implementations are shared between the provider that created them and the
/// emission loop that reports on them, so they must be `Send + Sync`.
/// `samples` is called once per tick and must only read in-memory state.
pub trait MonitoredEntity: Send + Sync {
    /// Stable identity, used for log correlation only
    fn id(&self) -> &str;

    /// Project the entity's time series are written into
    fn project_id(&self) -> &str;

    /// Base labels attached to every metric of this entity
    ///
    /// Must not change for the lifetime of an emission loop.
    fn labels(&self) -> &Labels;

    /// Extra labels attached only to `metric`
    ///
    /// The default attaches nothing.
    fn metric_labels(&self, _metric: &str) -> Labels {
        Labels::new()
    }

    /// Current readings
    ///
    /// Never fails: a missing optional counter is reported as `0.0`.
    fn samples(&self) -> Readings;
}
