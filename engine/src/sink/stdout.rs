//! Stdout sink for dry runs
//!
//! Prints each time series instead of sending it anywhere.

use async_trait::async_trait;
use loadsim_core::proto::TimeSeries;
use loadsim_core::{CreateTimeSeriesRequest, Sink, SinkError};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stdout sink - prints time series for debugging
pub struct StdoutSink {
    /// Multi-line output per time series
    pretty: bool,
    /// Count of time series written
    written_count: AtomicU64,
}

impl StdoutSink {
    /// One line per time series
    pub fn new() -> Self {
        Self {
            pretty: false,
            written_count: AtomicU64::new(0),
        }
    }

    /// Boxed multi-line output per time series
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            written_count: AtomicU64::new(0),
        }
    }

    /// Total time series written
    pub fn written_count(&self) -> u64 {
        self.written_count.load(Ordering::Relaxed)
    }

    fn write_series<W: Write>(&self, out: &mut W, project: &str, ts: &TimeSeries) -> std::io::Result<()> {
        let metric_type = ts.metric.as_ref().map(|m| m.r#type.as_str()).unwrap_or("");
        let value = ts
            .points
            .first()
            .and_then(|p| p.value.as_ref())
            .and_then(|v| v.as_double())
            .unwrap_or_default();

        // Sorted for stable output; proto maps are unordered
        let mut labels: Vec<(&String, &String)> = ts
            .metric
            .as_ref()
            .map(|m| m.labels.iter().collect())
            .unwrap_or_default();
        labels.sort();

        if self.pretty {
            writeln!(out, "┌─ TimeSeries ────────────────────────────────────────")?;
            writeln!(out, "│ Project:   {project}")?;
            writeln!(out, "│ Metric:    {metric_type}")?;
            writeln!(out, "│ Value:     {value}")?;
            if !labels.is_empty() {
                writeln!(out, "│ Labels:    {labels:?}")?;
            }
            if let Some(resource) = &ts.resource {
                writeln!(out, "│ Resource:  {}", resource.r#type)?;
            }
            writeln!(out, "└─────────────────────────────────────────────────────")
        } else {
            let rendered: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
            writeln!(out, "[{project}] {metric_type} {value} {{{}}}", rendered.join(","))
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn write(&self, request: &CreateTimeSeriesRequest) -> Result<(), SinkError> {
        let mut stdout = std::io::stdout().lock();
        let mut written = 0u64;

        for ts in &request.time_series {
            match self.write_series(&mut stdout, &request.name, ts) {
                Ok(()) => written += 1,
                Err(e) => {
                    self.written_count.fetch_add(written, Ordering::Relaxed);
                    return Err(SinkError::Send(format!("stdout write failed: {e}")));
                }
            }
        }

        self.written_count.fetch_add(written, Ordering::Relaxed);
        Ok(())
    }

    async fn health(&self) -> bool {
        true
    }
}
