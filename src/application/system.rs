use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::pipeline::SeriesPipeline;
use crate::application::scheduler::{RefreshScheduler, SeriesRefresher};
use crate::config::Config;
use crate::infrastructure::HttpClientFactory;
use crate::infrastructure::observability::{Metrics, MetricsServer, RefreshOutcome};
use crate::infrastructure::sources;

/// Running exporter: the scrape endpoint and the refresh loop.
pub struct SystemHandle {
    pub metrics: Metrics,
    pub local_addr: SocketAddr,
    pub server: JoinHandle<()>,
    pub scheduler: JoinHandle<()>,
}

pub struct Application {
    pub config: Config,
    pub metrics: Metrics,
    pub scheduler: RefreshScheduler,
}

impl Application {
    /// Wire metrics, sources and pipelines for every configured series.
    pub fn build(config: Config) -> Result<Self> {
        config.validate()?;
        info!(
            "Building ratewatch ({} series, refresh every {:?})...",
            config.series.len(),
            config.refresh_interval
        );

        let metrics = Metrics::new(&config.series).context("Failed to register series metrics")?;
        let client = HttpClientFactory::create_client(config.fetch_timeout);

        let mut refreshers = Vec::with_capacity(config.series.len());
        for descriptor in &config.series {
            let gauge = metrics
                .series_gauge(&descriptor.metric_name)
                .context(format!("No gauge registered for {}", descriptor.metric_name))?;
            let source = sources::reader_for(&descriptor.source, &client, config.fetch_timeout);
            info!("Series {} <- {}", descriptor.metric_name, source.describe());

            let pipeline = SeriesPipeline::new(descriptor.clone(), source, Arc::new(gauge))
                .with_read_deadline(config.fetch_timeout);
            refreshers.push(Arc::new(SeriesRefresher::new(pipeline, metrics.clone())));
        }

        let scheduler = RefreshScheduler::new(refreshers, config.refresh_interval);

        Ok(Self {
            config,
            metrics,
            scheduler,
        })
    }

    /// Refresh every series once and wait for the results.
    pub async fn refresh_all(&self) -> Vec<(String, RefreshOutcome)> {
        self.scheduler.run_once().await
    }

    /// Bind the endpoint, warm the gauges, then serve and refresh in the background.
    ///
    /// Connections queue on the bound socket until the first refresh finishes,
    /// so the first scrape never sees cold gauges.
    pub async fn start(self) -> Result<SystemHandle> {
        let server = MetricsServer::bind(
            self.config.listen_addr,
            self.config.metrics_path.clone(),
            self.metrics.clone(),
        )
        .await?;
        let local_addr = server.local_addr()?;

        for (series, outcome) in self.refresh_all().await {
            info!("Initial refresh of {}: {}", series, outcome.as_label());
        }

        let server = server.spawn();
        let scheduler = self.scheduler.spawn();

        Ok(SystemHandle {
            metrics: self.metrics,
            local_addr,
            server,
            scheduler,
        })
    }
}
