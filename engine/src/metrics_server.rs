//! HTTP server for Prometheus metrics and a health summary
//!
//! # Endpoints
//!
//! - `GET /metrics` - Prometheus metrics
//! - `GET /health` - JSON summary of the sink, running loops and sample counts
//!
//! # Example
//!
//! ```ignore
//! use loadsim_engine::metrics_server::MetricsServer;
//!
//! let metrics_handle = MetricsServer::start(config.metrics_addr, Some(sink.clone()));
//! // ...
//! metrics_handle.abort();
//! ```

use axum::extract::State;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use loadsim_core::Sink;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared state for the metrics server
#[derive(Clone)]
struct AppState {
    sink: Option<Arc<dyn Sink>>,
}

/// Metrics HTTP server
pub struct MetricsServer;

impl MetricsServer {
    /// Start the metrics server on `addr`
    ///
    /// Returns a JoinHandle that can be used to abort the server.
    /// A bind failure is logged and ends the task; emission is unaffected.
    /// When `sink` is given, `/health` reports its readiness.
    pub fn start(addr: SocketAddr, sink: Option<Arc<dyn Sink>>) -> JoinHandle<()> {
        let state = AppState { sink };

        tokio::spawn(async move {
            let app = router(state);

            info!(addr = %addr, "Metrics server starting");

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    error!(error = %e, addr = %addr, "Failed to bind metrics server");
                    return;
                }
            };

            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Metrics server error");
            }
        })
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Handler for /metrics endpoint
async fn metrics_handler() -> impl IntoResponse {
    let body = crate::metrics::gather();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

#[derive(serde::Serialize)]
struct HealthSummary {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sink: Option<SinkHealth>,
    active_loops: f64,
    samples: SampleSummary,
}

#[derive(serde::Serialize)]
struct SinkHealth {
    name: &'static str,
    healthy: bool,
}

#[derive(serde::Serialize)]
struct SampleSummary {
    accepted: f64,
    failed: f64,
    failure_ratio: f64,
}

/// Handler for /health endpoint
///
/// Always 200: failed submissions are the expected load-test signal, not a
/// reason to restart the process.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let sink = match &state.sink {
        Some(sink) => Some(SinkHealth {
            name: sink.name(),
            healthy: sink.health().await,
        }),
        None => None,
    };
    let sink_down = sink.as_ref().is_some_and(|s| !s.healthy);

    let Some(metrics) = crate::metrics::Metrics::get() else {
        let status = if sink_down { "degraded" } else { "ok" };
        return (StatusCode::OK, Json(serde_json::json!({"status": status}))).into_response();
    };

    let accepted = metrics.samples_accepted.get();
    let failed = metrics.samples_failed.get();
    let total = accepted + failed;
    let failure_ratio = if total > 0.0 { failed / total } else { 0.0 };

    let summary = HealthSummary {
        status: if sink_down || failure_ratio > 0.5 {
            "degraded"
        } else {
            "healthy"
        },
        sink,
        active_loops: metrics.active_loops.get(),
        samples: SampleSummary {
            accepted,
            failed,
            failure_ratio,
        },
    };

    (StatusCode::OK, Json(summary)).into_response()
}
