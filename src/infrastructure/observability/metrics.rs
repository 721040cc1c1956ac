//! Prometheus metrics definitions for ratewatch
//!
//! Series gauges use the configured metric names verbatim; internal metrics use
//! the `ratewatch_` prefix.

use crate::domain::series::SeriesDescriptor;
use prometheus::{CounterVec, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome label for `ratewatch_refresh_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Success,
    NoData,
    Failed,
    Skipped,
}

impl RefreshOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoData => "no_data",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Prometheus metrics for the exporter
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Latest observation per series, keyed by metric name
    series: Arc<HashMap<String, Gauge>>,
    /// Refresh runs by series and outcome
    pub refresh_total: CounterVec,
    /// Unix time of the last run that published a value
    pub last_success_timestamp: GaugeVec,
    /// Data rows whose value could not be parsed
    pub malformed_rows_total: CounterVec,
}

impl Metrics {
    /// Create a registry with one gauge per series plus the internal metrics
    pub fn new(descriptors: &[SeriesDescriptor]) -> anyhow::Result<Self> {
        let registry = Registry::new();

        let mut series = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let gauge = Gauge::with_opts(Opts::new(
                descriptor.metric_name.clone(),
                descriptor.help.clone(),
            ))?;
            registry.register(Box::new(gauge.clone()))?;
            series.insert(descriptor.metric_name.clone(), gauge);
        }

        let refresh_total = CounterVec::new(
            Opts::new(
                "ratewatch_refresh_total",
                "Series refresh runs by outcome",
            ),
            &["series", "outcome"],
        )?;
        registry.register(Box::new(refresh_total.clone()))?;

        let last_success_timestamp = GaugeVec::new(
            Opts::new(
                "ratewatch_last_success_timestamp_seconds",
                "Unix time of the last refresh that published a value",
            ),
            &["series"],
        )?;
        registry.register(Box::new(last_success_timestamp.clone()))?;

        let malformed_rows_total = CounterVec::new(
            Opts::new(
                "ratewatch_malformed_rows_total",
                "Data rows skipped because the value was not a number",
            ),
            &["series"],
        )?;
        registry.register(Box::new(malformed_rows_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            series: Arc::new(series),
            refresh_total,
            last_success_timestamp,
            malformed_rows_total,
        })
    }

    /// Gauge registered for a series' metric name
    pub fn series_gauge(&self, metric_name: &str) -> Option<Gauge> {
        self.series.get(metric_name).cloned()
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Count a finished refresh
    pub fn record_refresh(&self, series: &str, outcome: RefreshOutcome) {
        self.refresh_total
            .with_label_values(&[series, outcome.as_label()])
            .inc();
        if outcome == RefreshOutcome::Success {
            self.mark_published(series);
        }
    }

    /// Stamp the time a run last wrote a value, even if it later failed
    pub fn mark_published(&self, series: &str) {
        self.last_success_timestamp
            .with_label_values(&[series])
            .set(chrono::Utc::now().timestamp() as f64);
    }

    /// Count skipped malformed rows
    pub fn add_malformed_rows(&self, series: &str, count: usize) {
        if count > 0 {
            self.malformed_rows_total
                .with_label_values(&[series])
                .inc_by(count as f64);
        }
    }
}
