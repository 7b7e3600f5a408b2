//! Batch to `CreateTimeSeriesRequest` encoding

use crate::batch::Batch;
use loadsim_core::proto::{
    CreateTimeSeriesRequest, Metric, MonitoredResource, Point, TimeInterval, TimeSeries,
    TypedValue,
};
use std::collections::HashMap;
use std::time::SystemTime;

/// Monitored resource every time series is attributed to
///
/// `project_id` is filled per request from the entity's target project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub resource_type: String,
    pub location: String,
    pub namespace: String,
    pub job: String,
    pub task_id: String,
}

impl Default for ResourceDescriptor {
    fn default() -> Self {
        Self {
            resource_type: "generic_task".to_string(),
            location: "australia-southeast1".to_string(),
            namespace: "default".to_string(),
            job: "metric-sender".to_string(),
            task_id: "1".to_string(),
        }
    }
}

impl ResourceDescriptor {
    fn to_proto(&self, project_id: &str) -> MonitoredResource {
        MonitoredResource {
            r#type: self.resource_type.clone(),
            labels: HashMap::from([
                ("project_id".to_string(), project_id.to_string()),
                ("location".to_string(), self.location.clone()),
                ("namespace".to_string(), self.namespace.clone()),
                ("job".to_string(), self.job.clone()),
                ("task_id".to_string(), self.task_id.clone()),
            ]),
        }
    }
}

/// Builds wire requests from batches
#[derive(Debug, Clone)]
pub struct Encoder {
    metric_prefix: String,
    resource: ResourceDescriptor,
}

impl Encoder {
    pub fn new(metric_prefix: impl Into<String>, resource: ResourceDescriptor) -> Self {
        Self {
            metric_prefix: metric_prefix.into(),
            resource,
        }
    }

    /// Full metric type for a metric name
    pub fn metric_type(&self, metric: &str) -> String {
        format!("{}/{}", self.metric_prefix, metric)
    }

    /// One time series per sample, each with a single point at `now`
    pub fn encode(&self, project_id: &str, batch: &Batch, now: SystemTime) -> CreateTimeSeriesRequest {
        let end_time = prost_types::Timestamp::from(now);
        let resource = self.resource.to_proto(project_id);

        let time_series = batch
            .samples
            .iter()
            .map(|sample| TimeSeries {
                metric: Some(Metric {
                    r#type: self.metric_type(&sample.metric),
                    labels: sample
                        .labels
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                }),
                resource: Some(resource.clone()),
                points: vec![Point {
                    interval: Some(TimeInterval {
                        end_time: Some(end_time),
                        start_time: None,
                    }),
                    value: Some(TypedValue::double(sample.value)),
                }],
            })
            .collect();

        CreateTimeSeriesRequest {
            name: format!("projects/{project_id}"),
            time_series,
        }
    }
}
