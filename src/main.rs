//! ratewatch - Prometheus exporter for published interest-rate series
//!
//! Fetches each configured series once at startup and then every refresh
//! interval, publishing the latest observation as a gauge on `/metrics`.
//!
//! # Usage
//! ```sh
//! REFRESH_INTERVAL_SECS=86400 cargo run -- --listen 0.0.0.0:8080
//! cargo run -- --once
//! ```
//!
//! # Environment Variables
//! - `METRICS_BIND_ADDRESS` / `METRICS_PORT` / `METRICS_PATH` - Scrape endpoint (default: 0.0.0.0:8080/metrics)
//! - `REFRESH_INTERVAL_SECS` - Seconds between refreshes (default: 86400)
//! - `FETCH_TIMEOUT_SECS` - Deadline for each source read (default: 30)
//! - `SERIES_CONFIG` - TOML file listing the series to export (default: FRED mortgage rates)

use anyhow::Result;
use clap::Parser;
use ratewatch::application::system::Application;
use ratewatch::config::Config;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Prometheus exporter for published interest-rate series")]
struct Args {
    /// Address for the scrape endpoint (overrides METRICS_BIND_ADDRESS/METRICS_PORT)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Seconds between refreshes (overrides REFRESH_INTERVAL_SECS)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Refresh every series once, print the exposition text and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr so `--once` output stays clean on stdout
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    info!("ratewatch {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(secs) = args.interval_secs {
        if secs == 0 {
            anyhow::bail!("--interval-secs must be greater than zero");
        }
        config.refresh_interval = Duration::from_secs(secs);
    }
    info!(
        "Configuration loaded: Listen={}{}, Series={:?}",
        config.listen_addr,
        config.metrics_path,
        config
            .series
            .iter()
            .map(|s| s.metric_name.as_str())
            .collect::<Vec<_>>()
    );

    let app = Application::build(config)?;

    if args.once {
        app.refresh_all().await;
        print!("{}", app.metrics.render());
        return Ok(());
    }

    let handle = app.start().await?;
    info!(
        "Serving metrics on http://{}. Press Ctrl+C to shutdown.",
        handle.local_addr
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");
    handle.scheduler.abort();
    handle.server.abort();

    Ok(())
}
