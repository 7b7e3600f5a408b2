//! Sink trait for loadsim
//!
//! The [`Sink`] trait is the seam between the emission engine and the remote
//! time-series backend. One sink instance is shared read-only by every
//! emission loop.

use crate::error::SinkError;
use crate::proto::CreateTimeSeriesRequest;
use async_trait::async_trait;

/// Sink trait - accepts time-series submissions
///
/// # Implementation Requirements
///
/// - Sinks must be `Send + Sync`; every emission loop calls the same instance
/// - `write` must treat the request atomically: either every time series in
///   it is accepted (`Ok`) or the whole request is considered failed (`Err`)
/// - `write` may be called again with the same request after a failure
/// - Shutdown should release network connections
///
/// # Example
///
/// ```ignore
/// use loadsim_core::{Sink, SinkError};
/// use loadsim_core::proto::CreateTimeSeriesRequest;
/// use async_trait::async_trait;
///
/// struct CountingSink(std::sync::atomic::AtomicUsize);
///
/// #[async_trait]
/// impl Sink for CountingSink {
///     fn name(&self) -> &'static str {
///         "counting"
///     }
///
///     async fn write(&self, request: &CreateTimeSeriesRequest) -> Result<(), SinkError> {
///         self.0.fetch_add(request.time_series.len(), std::sync::atomic::Ordering::Relaxed);
///         Ok(())
///     }
///
///     async fn health(&self) -> bool {
///         true
///     }
/// }
/// ```
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs and metric labels ("monitoring", "stdout")
    fn name(&self) -> &'static str;

    /// Submit one batch of time series
    ///
    /// # Returns
    ///
    /// * `Ok(())` - every time series in the request was accepted
    /// * `Err(SinkError)` - the request as a whole failed
    async fn write(&self, request: &CreateTimeSeriesRequest) -> Result<(), SinkError>;

    /// Check whether the sink is currently able to accept writes
    ///
    /// Must be cheap; the metrics server's `/health` endpoint calls it on
    /// every request.
    async fn health(&self) -> bool;

    /// Release the underlying connection
    ///
    /// Called once during process shutdown, after every emission loop has
    /// stopped. The default implementation does nothing.
    async fn shutdown(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
