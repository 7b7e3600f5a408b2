//! Configuration for loadsim
//!
//! Everything is read once at startup from `LOADSIM_*` environment variables
//! (see [`Config::from_env`]) and then passed down explicitly. Nothing in the
//! engine reads process-wide state after construction.
//!
//! [`Config::emission`] and [`Config::submit`] project the values the
//! supervisor and submitter need.

use crate::error::{EngineError, Result};
use crate::submit::{ResourceDescriptor, RetryPolicy};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(EngineError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Which sink the emission loops write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Cloud Monitoring `CreateTimeSeries` over gRPC
    #[default]
    Monitoring,
    /// Print time series to stdout (dry run)
    Stdout,
}

impl FromStr for SinkKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "monitoring" | "gcm" => Ok(SinkKind::Monitoring),
            "stdout" => Ok(SinkKind::Stdout),
            other => Err(EngineError::Config(format!("unknown sink '{other}'"))),
        }
    }
}

/// Settings the supervisor and each emission loop run with
#[derive(Debug, Clone)]
pub struct EmissionConfig {
    /// Samples per submission call
    pub max_batch_size: usize,
    /// Sleep between two ticks of the same entity
    pub tick_interval: Duration,
    /// How long `stop_and_wait` waits before abandoning loops
    pub shutdown_grace: Duration,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 5,
            tick_interval: Duration::from_secs(300),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Settings the submitter runs with
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Prefix of every metric type, without the trailing slash
    pub metric_prefix: String,
    /// Monitored resource attached to every time series
    pub resource: ResourceDescriptor,
    /// Attempts and delay per batch
    pub retry: RetryPolicy,
    /// Pause between two batches of the same tick
    pub batch_pacing: Duration,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            metric_prefix: "custom.googleapis.com".to_string(),
            resource: ResourceDescriptor::default(),
            retry: RetryPolicy::default(),
            batch_pacing: Duration::from_millis(100),
        }
    }
}

/// Full process configuration
#[derive(Debug, Clone)]
pub struct Config {
    // ── Provisioning ────────────────────────────────────────────
    /// Consumer project; becomes the mocked account name
    pub consumer_project: String,
    /// Folder tenant projects are discovered under
    pub parent_folder: String,
    /// Candidate tenant projects handed to the project selector
    pub tenant_projects: Vec<String>,
    /// How many tenant projects to provision into
    pub num_tenant_projects: usize,
    /// Pools per tenant project
    pub pools_per_project: usize,
    /// Volumes per pool
    pub volumes_per_pool: usize,

    // ── Sink ────────────────────────────────────────────────────
    pub sink: SinkKind,
    /// Monitoring API endpoint
    pub endpoint: String,
    /// OAuth bearer token for the monitoring API
    pub access_token: Option<String>,
    /// Region label and resource location
    pub region: String,
    /// Cluster label
    pub cluster: String,

    // ── Engine ──────────────────────────────────────────────────
    pub emission: EmissionConfig,
    pub submit: SubmitConfig,

    // ── Observability ───────────────────────────────────────────
    /// Prometheus / health listen address
    pub metrics_addr: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        let region = "australia-southeast1".to_string();
        let submit = SubmitConfig {
            resource: ResourceDescriptor {
                location: region.clone(),
                ..ResourceDescriptor::default()
            },
            ..SubmitConfig::default()
        };

        Self {
            consumer_project: "vsa-billing-09".to_string(),
            parent_folder: "1025659400543".to_string(),
            tenant_projects: vec!["z257c6412e15fa257-tp".to_string()],
            num_tenant_projects: 1,
            pools_per_project: 2,
            volumes_per_pool: 3,
            sink: SinkKind::Monitoring,
            endpoint: "https://monitoring.googleapis.com".to_string(),
            access_token: None,
            region,
            cluster: "cluster-01".to_string(),
            emission: EmissionConfig::default(),
            submit,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from `LOADSIM_*` environment variables
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset keys keep their defaults; set but unparsable keys are errors.
    #[allow(clippy::result_large_err)]
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut c = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LOADSIM_CONSUMER_PROJECT") {
            c.consumer_project = v;
        }
        if let Some(v) = get("LOADSIM_PARENT_FOLDER") {
            c.parent_folder = v;
        }
        if let Some(v) = get("LOADSIM_TENANT_PROJECTS") {
            c.tenant_projects = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        parse_into(&get, "LOADSIM_NUM_TPS", &mut c.num_tenant_projects)?;
        parse_into(&get, "LOADSIM_NUM_POOLS", &mut c.pools_per_project)?;
        parse_into(&get, "LOADSIM_NUM_VOLUMES", &mut c.volumes_per_pool)?;

        parse_into(&get, "LOADSIM_SINK", &mut c.sink)?;
        if let Some(v) = get("LOADSIM_MONITORING_ENDPOINT") {
            c.endpoint = v;
        }
        c.access_token = get("LOADSIM_ACCESS_TOKEN").or_else(|| get("GOOGLE_OAUTH_ACCESS_TOKEN"));
        if let Some(v) = get("LOADSIM_REGION") {
            c.submit.resource.location = v.clone();
            c.region = v;
        }
        if let Some(v) = get("LOADSIM_CLUSTER") {
            c.cluster = v;
        }

        if let Some(v) = get("LOADSIM_METRIC_PREFIX") {
            c.submit.metric_prefix = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("LOADSIM_RESOURCE_NAMESPACE") {
            c.submit.resource.namespace = v;
        }
        if let Some(v) = get("LOADSIM_RESOURCE_JOB") {
            c.submit.resource.job = v;
        }
        if let Some(v) = get("LOADSIM_RESOURCE_TASK_ID") {
            c.submit.resource.task_id = v;
        }

        parse_into(&get, "LOADSIM_MAX_BATCH_SIZE", &mut c.emission.max_batch_size)?;
        parse_into(&get, "LOADSIM_MAX_RETRIES", &mut c.submit.retry.max_attempts)?;
        parse_millis(&get, "LOADSIM_RETRY_DELAY_MS", &mut c.submit.retry.delay)?;
        parse_millis(&get, "LOADSIM_BATCH_PACING_MS", &mut c.submit.batch_pacing)?;
        parse_millis(&get, "LOADSIM_SHUTDOWN_GRACE_MS", &mut c.emission.shutdown_grace)?;
        let mut tick_secs = c.emission.tick_interval.as_secs();
        parse_into(&get, "LOADSIM_TICK_INTERVAL_SECS", &mut tick_secs)?;
        c.emission.tick_interval = Duration::from_secs(tick_secs);

        parse_into(&get, "LOADSIM_METRICS_ADDR", &mut c.metrics_addr)?;
        if let Some(v) = get("LOADSIM_LOG_LEVEL") {
            c.log_level = v;
        }
        parse_into(&get, "LOADSIM_LOG_FORMAT", &mut c.log_format)?;

        c.validate()?;
        Ok(c)
    }

    /// Reject settings the engine cannot run with
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.emission.max_batch_size == 0 {
            return Err(EngineError::Config("max_batch_size must be >= 1".into()));
        }
        if self.submit.retry.max_attempts == 0 {
            return Err(EngineError::Config("max_retries must be >= 1".into()));
        }
        if self.emission.tick_interval.is_zero() {
            return Err(EngineError::Config("tick_interval must be > 0".into()));
        }
        if self.submit.metric_prefix.is_empty() {
            return Err(EngineError::Config("metric_prefix must not be empty".into()));
        }
        if self.sink == SinkKind::Monitoring && self.endpoint.is_empty() {
            return Err(EngineError::Config(
                "monitoring sink requires an endpoint".into(),
            ));
        }
        Ok(())
    }

    /// Settings for the loop supervisor
    pub fn emission(&self) -> EmissionConfig {
        self.emission.clone()
    }

    /// Settings for the submitter
    pub fn submit(&self) -> SubmitConfig {
        self.submit.clone()
    }
}

#[allow(clippy::result_large_err)]
fn parse_into<G, T>(get: &G, key: &str, slot: &mut T) -> Result<()>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = get(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| EngineError::Config(format!("{key}={raw}: {e}")))?;
    }
    Ok(())
}

#[allow(clippy::result_large_err)]
fn parse_millis<G>(get: &G, key: &str, slot: &mut Duration) -> Result<()>
where
    G: Fn(&str) -> Option<String>,
{
    let mut ms = slot.as_millis() as u64;
    parse_into(get, key, &mut ms)?;
    *slot = Duration::from_millis(ms);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.consumer_project, "vsa-billing-09");
        assert_eq!(config.num_tenant_projects, 1);
        assert_eq!(config.pools_per_project, 2);
        assert_eq!(config.volumes_per_pool, 3);
        assert_eq!(config.emission.max_batch_size, 5);
        assert_eq!(config.emission.tick_interval, Duration::from_secs(300));
        assert_eq!(config.submit.retry.max_attempts, 3);
        assert_eq!(config.submit.retry.delay, Duration::from_secs(2));
        assert_eq!(config.submit.batch_pacing, Duration::from_millis(100));
        assert_eq!(config.submit.metric_prefix, "custom.googleapis.com");
        assert_eq!(config.submit.resource.location, "australia-southeast1");
        assert_eq!(config.sink, SinkKind::Monitoring);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("LOADSIM_NUM_VOLUMES", "10"),
            ("LOADSIM_MAX_RETRIES", "5"),
            ("LOADSIM_RETRY_DELAY_MS", "250"),
            ("LOADSIM_TICK_INTERVAL_SECS", "30"),
            ("LOADSIM_REGION", "us-central1"),
            ("LOADSIM_SINK", "stdout"),
            ("LOADSIM_LOG_FORMAT", "json"),
            ("LOADSIM_METRIC_PREFIX", "custom.example.com/"),
            ("LOADSIM_TENANT_PROJECTS", "tp-a, tp-b,,tp-c"),
        ]))
        .unwrap();

        assert_eq!(config.volumes_per_pool, 10);
        assert_eq!(config.submit.retry.max_attempts, 5);
        assert_eq!(config.submit.retry.delay, Duration::from_millis(250));
        assert_eq!(config.emission.tick_interval, Duration::from_secs(30));
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.submit.resource.location, "us-central1");
        assert_eq!(config.sink, SinkKind::Stdout);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.submit.metric_prefix, "custom.example.com");
        assert_eq!(config.tenant_projects, vec!["tp-a", "tp-b", "tp-c"]);
    }

    #[test]
    fn test_access_token_fallback() {
        let config =
            Config::from_lookup(lookup(&[("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.token")])).unwrap();
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
    }

    #[test]
    fn test_unparsable_value_is_error() {
        let err = Config::from_lookup(lookup(&[("LOADSIM_MAX_BATCH_SIZE", "five")])).unwrap_err();
        assert!(err.to_string().contains("LOADSIM_MAX_BATCH_SIZE"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Config::from_lookup(lookup(&[("LOADSIM_MAX_BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = Config::from_lookup(lookup(&[("LOADSIM_MAX_RETRIES", "0")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_unknown_sink_rejected() {
        assert!("kafka".parse::<SinkKind>().is_err());
        assert_eq!("GCM".parse::<SinkKind>().unwrap(), SinkKind::Monitoring);
    }
}
