//! Error types for the emission engine

use thiserror::Error;

pub use loadsim_core::SinkError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the engine
///
/// Only setup paths return these. Once emission loops are running, sink
/// failures are absorbed into per-tick counters and never surface here.
#[derive(Error, Debug)]
#[allow(clippy::result_large_err)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Sink error
    #[error("sink '{sink}' error: {source}")]
    Sink {
        sink: String,
        #[source]
        source: SinkError,
    },

    /// Metrics error
    #[error("metrics error: {0}")]
    Metrics(String),
}

impl From<SinkError> for EngineError {
    fn from(err: SinkError) -> Self {
        EngineError::Sink {
            sink: "unknown".to_string(),
            source: err,
        }
    }
}

impl EngineError {
    /// Attach the sink name to a sink error
    pub fn sink(sink: &str, source: SinkError) -> Self {
        EngineError::Sink {
            sink: sink.to_string(),
            source,
        }
    }
}
