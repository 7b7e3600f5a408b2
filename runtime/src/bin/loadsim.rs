//! loadsim - synthetic storage telemetry generator
//!
//! Provisions mock volumes, reports their usage to Cloud Monitoring every
//! tick until interrupted, then removes the mock resources again.
//!
//! Settings come from `LOADSIM_*` environment variables; flags override them.

use anyhow::Context;
use clap::Parser;
use loadsim_engine::{Config, SinkKind};
use loadsim_runtime::RuntimeBuilder;

/// Synthetic storage telemetry generator
#[derive(Parser, Debug)]
#[command(name = "loadsim", version, about)]
struct Args {
    /// Consumer project (becomes the account name)
    #[arg(long)]
    consumer_project: Option<String>,

    /// Folder tenant projects are discovered under
    #[arg(long)]
    parent_folder: Option<String>,

    /// Number of tenant projects to provision into
    #[arg(long = "num-tps")]
    num_tenant_projects: Option<usize>,

    /// Pools per tenant project
    #[arg(long = "num-pools")]
    pools_per_project: Option<usize>,

    /// Volumes per pool
    #[arg(long = "num-volumes")]
    volumes_per_pool: Option<usize>,

    /// Skip database migrations
    #[arg(long)]
    skip_migrations: bool,

    /// Sink to write to (monitoring, stdout)
    #[arg(long)]
    sink: Option<SinkKind>,

    /// Print time series instead of sending them; same as --sink stdout
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn apply(self, config: &mut Config) -> bool {
        if let Some(v) = self.consumer_project {
            config.consumer_project = v;
        }
        if let Some(v) = self.parent_folder {
            config.parent_folder = v;
        }
        if let Some(v) = self.num_tenant_projects {
            config.num_tenant_projects = v;
        }
        if let Some(v) = self.pools_per_project {
            config.pools_per_project = v;
        }
        if let Some(v) = self.volumes_per_pool {
            config.volumes_per_pool = v;
        }
        if let Some(v) = self.sink {
            config.sink = v;
        }
        if self.dry_run {
            config.sink = SinkKind::Stdout;
        }
        self.skip_migrations
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env().context("failed to load configuration")?;
    let skip_migrations = args.apply(&mut config);

    loadsim_runtime::init_tracing(&config);

    let summary = RuntimeBuilder::new(config)
        .skip_migrations(skip_migrations)
        .run()
        .await?;

    if !summary.teardown.is_clean() {
        tracing::warn!(
            failed = summary.teardown.failed.len(),
            "some mock resources were left behind"
        );
    }

    Ok(())
}
