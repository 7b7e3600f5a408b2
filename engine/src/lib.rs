//! loadsim-engine - Telemetry emission engine
//!
//! Drives synthetic telemetry for a set of monitored entities into a remote
//! time-series backend.
//!
//! ```text
//! Supervisor ──► EmissionLoop (per entity) ──► Batcher ──► Submitter ──► Sink
//! ```
//!
//! Each loop reads its entity's samples on a fixed cadence, cuts them into
//! batches and submits each batch with bounded fixed-delay retry. Failures
//! end up in counters and log lines; they never stop a loop.

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod batch;
pub mod config;
pub mod emission;
pub mod error;
pub mod metrics;
pub mod metrics_server;
pub mod sink;
pub mod submit;

pub use batch::{Batch, entity_batches, partition};
pub use config::{Config, EmissionConfig, LogFormat, SinkKind, SubmitConfig};
pub use emission::{EmissionLoop, StopReport, Supervisor, SupervisorHandle};
pub use error::{EngineError, Result};
pub use metrics_server::MetricsServer;
pub use sink::{MonitoringSink, StdoutSink};
pub use submit::{Encoder, ResourceDescriptor, RetryPolicy, SubmissionOutcome, Submitter};

pub use loadsim_core::{
    CreateTimeSeriesRequest, Labels, MonitoredEntity, Readings, Sample, Sink, SinkError,
};
