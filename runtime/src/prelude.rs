//! Convenience re-exports for embedding loadsim.
//!
//! ```rust
//! use loadsim_runtime::prelude::*;
//! ```

// Core types
pub use loadsim_core::{Labels, MonitoredEntity, Readings, Sample};

// Configuration
pub use loadsim_engine::{Config, EmissionConfig, LogFormat, SinkKind, SubmitConfig};

// Sinks
pub use loadsim_engine::{MonitoringSink, Sink, StdoutSink};

// Emission
pub use loadsim_engine::{RetryPolicy, StopReport, Submitter, Supervisor, SupervisorHandle};

// Resource provider
pub use loadsim_mock::{
    Inventory, MemoryStore, ProjectSelector, ProviderConfig, ResourceProvider,
    StaticProjectSelector, Store, TeardownReport,
};

// Error types
pub use loadsim_core::SinkError;
pub use loadsim_engine::EngineError;
pub use loadsim_mock::ProvisionError;

// Runtime
pub use crate::{RunSummary, RuntimeBuilder};
