//! Sink implementations
//!
//! - [`MonitoringSink`] - Cloud Monitoring `CreateTimeSeries` over gRPC
//! - [`StdoutSink`] - prints time series (dry run)

mod monitoring;
mod stdout;

pub use loadsim_core::Sink;
pub use monitoring::MonitoringSink;
pub use stdout::StdoutSink;

use crate::config::{Config, SinkKind};
use crate::error::{EngineError, Result};
use std::sync::Arc;

/// Build the sink selected by `config`
#[allow(clippy::result_large_err)]
pub fn from_config(config: &Config) -> Result<Arc<dyn Sink>> {
    match config.sink {
        SinkKind::Monitoring => {
            let sink = MonitoringSink::new(&config.endpoint, config.access_token.as_deref())
                .map_err(|e| EngineError::sink("monitoring", e))?;
            Ok(Arc::new(sink))
        }
        SinkKind::Stdout => Ok(Arc::new(StdoutSink::new())),
    }
}
