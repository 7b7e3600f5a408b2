//! loadsim-core - Core types for the loadsim telemetry engine
//!
//! This crate provides the foundational types shared between the emission
//! engine, the resource provider and sink implementations:
//!
//! - [`Sink`] trait - async interface for submitting time series to a backend
//! - [`SinkError`] - error type for sink operations
//! - [`MonitoredEntity`] - something the engine reports telemetry for
//! - [`Sample`], [`Labels`], [`Readings`] - per-tick data
//! - [`proto`] - `google.monitoring.v3` wire types
//!
//! # Why this crate exists
//!
//! The mock resource provider implements [`MonitoredEntity`] and the engine
//! consumes it. Keeping the trait here lets both depend on it without the
//! provider depending on the engine:
//!
//! ```text
//! loadsim-core ◄── loadsim-engine
//!     ▲
//!     └────────── loadsim-mock
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

mod entity;
mod error;
/// `google.monitoring.v3` wire types
pub mod proto;
mod sink;

pub use entity::{Labels, MonitoredEntity, Readings, Sample};
pub use error::SinkError;
pub use proto::CreateTimeSeriesRequest;
pub use sink::Sink;
