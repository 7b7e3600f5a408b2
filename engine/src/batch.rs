//! Partitioning of one tick's readings into submission batches

use loadsim_core::{Labels, MonitoredEntity, Readings, Sample};

/// An ordered group of samples submitted in one call
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// 0-based position within the tick
    pub index: usize,
    pub samples: Vec<Sample>,
}

impl Batch {
    /// 1-based batch number, as it appears in log lines
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Split `readings` into batches of at most `max_batch_size` samples
///
/// Readings are taken in lexicographic metric-name order and every reading
/// lands in exactly one batch. `label_builder` produces the full label set
/// for a metric name. A `max_batch_size` of 0 is treated as 1; configuration
/// validation rejects it before it gets here.
pub fn partition<F>(readings: &Readings, label_builder: F, max_batch_size: usize) -> Vec<Batch>
where
    F: Fn(&str) -> Labels,
{
    let samples: Vec<Sample> = readings
        .iter()
        .map(|(metric, value)| Sample::new(metric.as_str(), *value, label_builder(metric)))
        .collect();

    samples
        .chunks(max_batch_size.max(1))
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            samples: chunk.to_vec(),
        })
        .collect()
}

/// Read an entity and partition its readings
///
/// Each sample carries the entity's base labels overlaid with the labels
/// specific to that metric.
pub fn entity_batches(entity: &dyn MonitoredEntity, max_batch_size: usize) -> Vec<Batch> {
    let readings = entity.samples();
    partition(
        &readings,
        |metric| {
            let mut labels = entity.labels().clone();
            labels.extend(entity.metric_labels(metric));
            labels
        },
        max_batch_size,
    )
}
