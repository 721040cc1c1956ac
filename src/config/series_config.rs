//! Series and refresh configuration.
//!
//! The tracked series default to the two FRED mortgage rates. A TOML file named
//! by `SERIES_CONFIG` replaces that list:
//!
//! ```toml
//! [[series]]
//! name = "mortgage30us"
//! help = "30-Year Fixed Rate Mortgage Average in the United States"
//! source = "https://fred.stlouisfed.org/data/MORTGAGE30US.txt"
//! # header = "DATE        VALUE"
//! ```

use crate::domain::series::{SeriesDescriptor, SourceLocator};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
/// Upper bound for any configured duration (one year)
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Series environment configuration
#[derive(Debug, Clone)]
pub struct SeriesEnvConfig {
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub series: Vec<SeriesDescriptor>,
}

#[derive(Debug, Deserialize)]
struct SeriesFile {
    series: Vec<SeriesEntry>,
}

#[derive(Debug, Deserialize)]
struct SeriesEntry {
    name: String,
    help: String,
    source: String,
    header: Option<String>,
}

impl SeriesEnvConfig {
    pub fn from_env() -> Result<Self> {
        let refresh_interval =
            Self::parse_secs("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS)?;
        let fetch_timeout = Self::parse_secs("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;

        let series = match env::var("SERIES_CONFIG") {
            Ok(path) if !path.is_empty() => load_series_from_toml(&path)?,
            _ => SeriesDescriptor::fred_defaults(),
        };

        Ok(Self {
            refresh_interval,
            fetch_timeout,
            series,
        })
    }

    fn parse_secs(key: &str, default: u64) -> Result<Duration> {
        let secs = env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u64>()
            .context(format!("Failed to parse {}", key))?;
        if secs == 0 {
            anyhow::bail!("{} must be greater than zero", key);
        }
        if secs > MAX_INTERVAL_SECS {
            anyhow::bail!("{} must be at most {} seconds", key, MAX_INTERVAL_SECS);
        }
        Ok(Duration::from_secs(secs))
    }
}

/// Loads the series list from a TOML file.
pub fn load_series_from_toml(path: &str) -> Result<Vec<SeriesDescriptor>> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read series config file: {}", path))?;
    parse_series_toml(&content).context(format!("Invalid series config: {}", path))
}

fn parse_series_toml(content: &str) -> Result<Vec<SeriesDescriptor>> {
    let file: SeriesFile = toml::from_str(content).context("Failed to parse series TOML")?;
    if file.series.is_empty() {
        anyhow::bail!("At least one [[series]] entry is required");
    }

    Ok(file
        .series
        .into_iter()
        .map(|entry| {
            let descriptor =
                SeriesDescriptor::new(entry.name, entry.help, SourceLocator::parse(&entry.source));
            match entry.header {
                Some(header) => descriptor.with_header_marker(header),
                None => descriptor,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::DEFAULT_HEADER_MARKER;

    #[test]
    fn test_parse_series_toml() {
        let series = parse_series_toml(
            r#"
            [[series]]
            name = "mortgage30us"
            help = "30-Year Fixed Rate Mortgage Average in the United States"
            source = "https://fred.stlouisfed.org/data/MORTGAGE30US.txt"

            [[series]]
            name = "local_rate"
            help = "Rate read from disk"
            source = "/var/lib/ratewatch/rate.txt"
            header = "observation_date  VALUE"
            "#,
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].header_marker, DEFAULT_HEADER_MARKER);
        assert!(matches!(series[0].source, SourceLocator::Url(_)));
        assert_eq!(series[1].header_marker, "observation_date  VALUE");
        assert!(matches!(series[1].source, SourceLocator::Path(_)));
    }

    #[test]
    fn test_empty_series_list_is_rejected() {
        assert!(parse_series_toml("series = []").is_err());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        assert!(
            parse_series_toml(
                r#"
                [[series]]
                name = "mortgage30us"
                source = "MORTGAGE30US.txt"
                "#
            )
            .is_err()
        );
    }
}
