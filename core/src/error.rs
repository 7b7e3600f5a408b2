//! Error types for loadsim sinks

use thiserror::Error;

/// Error type for sink operations
///
/// Every failure a [`Sink`](crate::Sink) can report falls into one of these
/// categories. The submitter treats all of them as a failed attempt for the
/// whole batch; the category only matters for logging.
///
/// # Example
///
/// ```
/// use loadsim_core::SinkError;
///
/// fn write_batch() -> Result<(), SinkError> {
///     Err(SinkError::Connection("refused".to_string()))
/// }
///
/// match write_batch() {
///     Ok(_) => println!("accepted"),
///     Err(SinkError::Connection(msg)) => println!("connection failed: {}", msg),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Initialization failed
    ///
    /// Invalid endpoint URL, bad credentials, TLS configuration error.
    /// Returned during setup and treated as fatal by the runtime.
    #[error("initialization failed: {0}")]
    Init(String),

    /// Connection error
    ///
    /// DNS lookup failed, connection refused, TLS handshake error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Send failed
    ///
    /// The request could not be delivered (timeout, broken stream, local
    /// write error).
    #[error("send failed: {0}")]
    Send(String),

    /// The sink received the request and rejected it
    ///
    /// `code` is the backend status code name (e.g. `InvalidArgument`).
    #[error("rejected by sink ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Not ready
    ///
    /// The sink was used before it finished connecting or after shutdown.
    #[error("sink not ready")]
    NotReady,
}
