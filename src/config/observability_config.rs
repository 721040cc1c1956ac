//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the scrape endpoint settings.

use anyhow::{Context, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub port: u16,
    pub bind_address: String,
    pub metrics_path: String,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("METRICS_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .context(format!("Failed to parse METRICS_PORT: {}", raw))?,
            Err(_) => defaults.port,
        };

        let metrics_path = env::var("METRICS_PATH").unwrap_or(defaults.metrics_path);
        if !metrics_path.starts_with('/') {
            anyhow::bail!("METRICS_PATH must start with '/': {}", metrics_path);
        }

        Ok(Self {
            port,
            bind_address: env::var("METRICS_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            metrics_path,
        })
    }

    /// Socket address the scrape endpoint binds to
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip = self
            .bind_address
            .parse::<IpAddr>()
            .context(format!("Invalid METRICS_BIND_ADDRESS: {}", self.bind_address))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
