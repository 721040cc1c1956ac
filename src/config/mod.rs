//! Configuration module for ratewatch.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Series (what to fetch and how often) and Observability
//! (where the scrape endpoint listens).

mod observability_config;
mod series_config;

pub use observability_config::ObservabilityEnvConfig;
pub use series_config::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_REFRESH_INTERVAL_SECS, MAX_INTERVAL_SECS,
    SeriesEnvConfig, load_series_from_toml,
};

use crate::domain::series::SeriesDescriptor;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Scrape endpoint (from ObservabilityEnvConfig)
    pub listen_addr: SocketAddr,
    pub metrics_path: String,

    // Refresh (from SeriesEnvConfig)
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub series: Vec<SeriesDescriptor>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let observability =
            ObservabilityEnvConfig::from_env().context("Failed to load observability config")?;
        let series = SeriesEnvConfig::from_env().context("Failed to load series config")?;

        let config = Self {
            listen_addr: observability.listen_addr()?,
            metrics_path: observability.metrics_path,
            refresh_interval: series.refresh_interval,
            fetch_timeout: series.fetch_timeout,
            series: series.series,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would collide in the metrics registry.
    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            anyhow::bail!("No series configured");
        }
        for (key, value) in [
            ("refresh interval", self.refresh_interval),
            ("fetch timeout", self.fetch_timeout),
        ] {
            if value.is_zero() || value > Duration::from_secs(MAX_INTERVAL_SECS) {
                anyhow::bail!(
                    "The {} must be between 1 and {} seconds",
                    key,
                    MAX_INTERVAL_SECS
                );
            }
        }

        let mut seen = HashSet::new();
        for descriptor in &self.series {
            if !seen.insert(descriptor.metric_name.as_str()) {
                anyhow::bail!("Duplicate series metric name: {}", descriptor.metric_name);
            }
            if descriptor.header_marker.is_empty() {
                anyhow::bail!("Empty header marker for series {}", descriptor.metric_name);
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            metrics_path: "/metrics".to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            series: SeriesDescriptor::fred_defaults(),
        }
    }
}
