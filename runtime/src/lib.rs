//! loadsim runtime - one process run from configuration to teardown
//!
//! Provides [`run()`] for the standard startup, and [`RuntimeBuilder`] for
//! callers that bring their own sink, store, project selector or shutdown
//! trigger.
//!
//! # Lifecycle
//!
//! ```text
//! config ─► sink ─► metrics ─► provision ─► emission loops
//!                                                │ shutdown signal
//!                                                ▼
//!                       sink shutdown ◄─ teardown ◄─ stop loops
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = loadsim_engine::Config::from_env()?;
//!     loadsim_runtime::run(config).await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod prelude;

use anyhow::Context;
use loadsim_core::Sink;
use loadsim_engine::config::{Config, LogFormat};
use loadsim_engine::metrics::{self, Metrics};
use loadsim_engine::{MetricsServer, StopReport, Submitter, Supervisor};
use loadsim_mock::{
    MemoryStore, ProjectSelector, ProviderConfig, ResourceProvider, Site, StaticProjectSelector,
    Store, TeardownReport,
};
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run loadsim with `config` until SIGINT or SIGTERM
///
/// Initialises tracing, then runs the full lifecycle with the sink the
/// config selects, an in-memory store and the configured tenant projects.
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);
    RuntimeBuilder::new(config).run().await.map(|_| ())
}

/// What a completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Emission loops started
    pub loops: usize,
    pub stop: StopReport,
    pub teardown: TeardownReport,
}

/// Builder for a single loadsim run
///
/// # Example
///
/// ```ignore
/// let summary = RuntimeBuilder::new(config)
///     .sink(Arc::new(StdoutSink::pretty()))
///     .selector(Arc::new(StaticProjectSelector::new(["tp-1", "tp-2"])))
///     .without_metrics_server()
///     .run_until(tokio::time::sleep(Duration::from_secs(60)))
///     .await?;
/// ```
pub struct RuntimeBuilder {
    config: Config,
    sink: Option<Arc<dyn Sink>>,
    store: Option<Arc<dyn Store>>,
    selector: Option<Arc<dyn ProjectSelector>>,
    skip_migrations: bool,
    metrics_server: bool,
}

impl RuntimeBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink: None,
            store: None,
            selector: None,
            skip_migrations: false,
            metrics_server: true,
        }
    }

    /// Use `sink` instead of the one the config selects
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Provision into `store` instead of a fresh [`MemoryStore`]
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Discover tenant projects with `selector`
    ///
    /// Default: a [`StaticProjectSelector`] over `config.tenant_projects`.
    pub fn selector(mut self, selector: Arc<dyn ProjectSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn skip_migrations(mut self, skip: bool) -> Self {
        self.skip_migrations = skip;
        self
    }

    /// Do not serve `/metrics` and `/health`
    pub fn without_metrics_server(mut self) -> Self {
        self.metrics_server = false;
        self
    }

    /// Run until SIGINT or SIGTERM
    pub async fn run(self) -> anyhow::Result<RunSummary> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` completes
    ///
    /// This is the terminal method. Setup failures (invalid config, sink
    /// construction, provisioning) are returned as errors; everything after
    /// the loops start is reported in the [`RunSummary`].
    pub async fn run_until<S>(self, shutdown: S) -> anyhow::Result<RunSummary>
    where
        S: Future<Output = ()>,
    {
        let config = self.config;
        config.validate().context("invalid configuration")?;

        info!(
            consumer_project = %config.consumer_project,
            sink = ?config.sink,
            tenant_projects = config.num_tenant_projects,
            pools_per_project = config.pools_per_project,
            volumes_per_pool = config.volumes_per_pool,
            tick_secs = config.emission.tick_interval.as_secs(),
            "Starting loadsim"
        );

        // ── 1. Sink ──────────────────────────────────────────────
        let sink = match self.sink {
            Some(sink) => sink,
            None => loadsim_engine::sink::from_config(&config).context("failed to build sink")?,
        };

        // ── 2. Metrics ───────────────────────────────────────────
        if let Err(e) = Metrics::init() {
            shutdown_sink(sink.as_ref()).await;
            return Err(e).context("failed to register metrics");
        }
        let metrics_handle = self
            .metrics_server
            .then(|| MetricsServer::start(config.metrics_addr, Some(Arc::clone(&sink))));

        // ── 3. Provision ─────────────────────────────────────────
        if self.skip_migrations {
            info!("skipping database migrations");
        } else {
            info!("no schema to migrate for the in-memory store");
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn Store>);
        let selector = self.selector.unwrap_or_else(|| {
            Arc::new(StaticProjectSelector::new(config.tenant_projects.clone()))
                as Arc<dyn ProjectSelector>
        });
        let provider = ResourceProvider::new(store, provider_config(&config));

        let inventory = match provider.provision(selector.as_ref()).await {
            Ok(inventory) => inventory,
            Err(e) => {
                shutdown_sink(sink.as_ref()).await;
                abort_metrics_server(metrics_handle);
                return Err(e).context("failed to set up mock resources");
            }
        };

        // ── 4. Emission ──────────────────────────────────────────
        let submitter = Arc::new(Submitter::new(Arc::clone(&sink), config.submit()));
        let handle = Supervisor::new(submitter, config.emission()).start(inventory.entities());
        let loops = handle.len();

        shutdown.await;

        // ── 5. Shutdown ──────────────────────────────────────────
        let stop = handle.stop_and_wait().await;
        if !stop.is_clean() {
            warn!(
                panicked = stop.panicked,
                abandoned = stop.abandoned.len(),
                "some emission loops did not stop cleanly"
            );
        }

        let teardown = provider.teardown(&inventory);
        for (kind, _) in &teardown.failed {
            metrics::try_record_teardown_failure(kind.as_str());
        }

        shutdown_sink(sink.as_ref()).await;
        abort_metrics_server(metrics_handle);
        info!(loops, ticks = stop.ticks, "loadsim shutdown complete");

        Ok(RunSummary {
            loops,
            stop,
            teardown,
        })
    }
}

fn provider_config(config: &Config) -> ProviderConfig {
    ProviderConfig {
        consumer_project: config.consumer_project.clone(),
        parent_folder: config.parent_folder.clone(),
        num_tenant_projects: config.num_tenant_projects,
        pools_per_project: config.pools_per_project,
        volumes_per_pool: config.volumes_per_pool,
        site: Site {
            region: config.region.clone(),
            cluster: config.cluster.clone(),
        },
    }
}

async fn shutdown_sink(sink: &dyn Sink) {
    if let Err(e) = sink.shutdown().await {
        error!(sink = sink.name(), error = %e, "sink shutdown failed");
    }
}

fn abort_metrics_server(handle: Option<tokio::task::JoinHandle<()>>) {
    if let Some(handle) = handle {
        handle.abort();
    }
}

/// Initialise the tracing subscriber based on config.
///
/// `RUST_LOG` wins over the configured level. Only the first call in a
/// process installs a subscriber.
pub fn init_tracing(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if installed.is_err() {
        warn!("tracing subscriber already installed");
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = ?e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
