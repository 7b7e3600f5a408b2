//! Wire types for `google.monitoring.v3.MetricService/CreateTimeSeries`
//!
//! Hand-maintained subset of the googleapis protos: only the messages and
//! fields the engine writes are declared. Field tags match upstream
//! (`google/monitoring/v3/metric_service.proto`, `metric.proto`,
//! `common.proto`, `google/api/metric.proto`,
//! `google/api/monitored_resource.proto`), so the encoding is
//! wire-compatible with the real service.

#![allow(clippy::derive_partial_eq_without_eq)]

use std::collections::HashMap;

/// gRPC path of the `CreateTimeSeries` method
pub const CREATE_TIME_SERIES_PATH: &str =
    "/google.monitoring.v3.MetricService/CreateTimeSeries";

/// `google.monitoring.v3.CreateTimeSeriesRequest`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTimeSeriesRequest {
    /// `projects/<project id>`
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub time_series: Vec<TimeSeries>,
}

/// `google.monitoring.v3.TimeSeries`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeSeries {
    #[prost(message, optional, tag = "1")]
    pub metric: Option<Metric>,
    #[prost(message, optional, tag = "2")]
    pub resource: Option<MonitoredResource>,
    #[prost(message, repeated, tag = "5")]
    pub points: Vec<Point>,
}

/// `google.api.Metric`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Metric {
    /// e.g. `custom.googleapis.com/volume_capacity`
    #[prost(string, tag = "3")]
    pub r#type: String,
    #[prost(map = "string, string", tag = "2")]
    pub labels: HashMap<String, String>,
}

/// `google.api.MonitoredResource`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MonitoredResource {
    /// e.g. `generic_task`
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(map = "string, string", tag = "2")]
    pub labels: HashMap<String, String>,
}

/// `google.monitoring.v3.Point`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Point {
    #[prost(message, optional, tag = "1")]
    pub interval: Option<TimeInterval>,
    #[prost(message, optional, tag = "2")]
    pub value: Option<TypedValue>,
}

/// `google.monitoring.v3.TimeInterval`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeInterval {
    #[prost(message, optional, tag = "2")]
    pub end_time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "1")]
    pub start_time: Option<::prost_types::Timestamp>,
}

/// `google.monitoring.v3.TypedValue`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypedValue {
    #[prost(oneof = "typed_value::Value", tags = "1, 2, 3, 4")]
    pub value: Option<typed_value::Value>,
}

/// Nested types for [`TypedValue`]
pub mod typed_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(bool, tag = "1")]
        BoolValue(bool),
        #[prost(int64, tag = "2")]
        Int64Value(i64),
        #[prost(double, tag = "3")]
        DoubleValue(f64),
        #[prost(string, tag = "4")]
        StringValue(String),
    }
}

impl TypedValue {
    pub fn double(value: f64) -> Self {
        Self {
            value: Some(typed_value::Value::DoubleValue(value)),
        }
    }

    /// The double payload, if this value carries one
    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            Some(typed_value::Value::DoubleValue(v)) => Some(v),
            _ => None,
        }
    }
}
