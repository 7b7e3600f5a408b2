//! Cloud Monitoring sink
//!
//! Unary `google.monitoring.v3.MetricService/CreateTimeSeries` calls over a
//! single lazily connected tonic channel. The channel multiplexes requests,
//! so one sink serves every emission loop.

use async_trait::async_trait;
use loadsim_core::proto::CREATE_TIME_SERIES_PATH;
use loadsim_core::{CreateTimeSeriesRequest, Sink, SinkError};
use parking_lot::Mutex;
use std::time::Duration;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status};
use tracing::{debug, info};

/// Default connect timeout (10 seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default request timeout (30 seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Sink writing time series to the Cloud Monitoring API
pub struct MonitoringSink {
    endpoint: String,
    /// `None` once shut down
    channel: Mutex<Option<Channel>>,
    authorization: Option<MetadataValue<Ascii>>,
}

impl MonitoringSink {
    /// Configure a sink for `endpoint` without connecting
    ///
    /// `https` endpoints use TLS with the platform's native roots. When an
    /// access token is given every request carries it as a bearer token.
    /// Must be called from within a tokio runtime.
    pub fn new(endpoint: &str, access_token: Option<&str>) -> Result<Self, SinkError> {
        let mut builder = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| SinkError::Init(format!("invalid endpoint URL '{endpoint}': {e}")))?
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        if endpoint.starts_with("https://") {
            builder = builder
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| SinkError::Init(format!("TLS configuration failed: {e}")))?;
        }

        let authorization = access_token
            .map(|token| {
                format!("Bearer {token}")
                    .parse::<MetadataValue<Ascii>>()
                    .map_err(|e| SinkError::Init(format!("invalid access token: {e}")))
            })
            .transpose()?;

        let channel = builder.connect_lazy();
        debug!(endpoint = %endpoint, "monitoring sink configured (lazy)");

        Ok(Self {
            endpoint: endpoint.to_string(),
            channel: Mutex::new(Some(channel)),
            authorization,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn channel(&self) -> Option<Channel> {
        self.channel.lock().clone()
    }
}

/// Map a gRPC status to the sink error vocabulary
pub(crate) fn map_status(status: Status) -> SinkError {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
            SinkError::Connection(status.message().to_string())
        }
        code => SinkError::Rejected {
            code: format!("{code:?}"),
            message: status.message().to_string(),
        },
    }
}

#[async_trait]
impl Sink for MonitoringSink {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    async fn write(&self, request: &CreateTimeSeriesRequest) -> Result<(), SinkError> {
        let channel = self.channel().ok_or(SinkError::NotReady)?;
        let mut grpc = tonic::client::Grpc::new(channel);

        grpc.ready()
            .await
            .map_err(|e| SinkError::Connection(format!("{}: {e}", self.endpoint)))?;

        let mut req = tonic::Request::new(request.clone());
        if let Some(auth) = &self.authorization {
            req.metadata_mut().insert("authorization", auth.clone());
        }

        let codec = ProstCodec::<CreateTimeSeriesRequest, ()>::default();
        grpc.unary(req, PathAndQuery::from_static(CREATE_TIME_SERIES_PATH), codec)
            .await
            .map(|_| ())
            .map_err(map_status)
    }

    async fn health(&self) -> bool {
        self.channel.lock().is_some()
    }

    async fn shutdown(&self) -> Result<(), SinkError> {
        if self.channel.lock().take().is_some() {
            info!(endpoint = %self.endpoint, "monitoring sink channel released");
        }
        Ok(())
    }
}
