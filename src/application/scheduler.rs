use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::application::pipeline::SeriesPipeline;
use crate::config::MAX_INTERVAL_SECS;
use crate::domain::errors::PipelineError;
use crate::infrastructure::observability::{Metrics, RefreshOutcome};

/// Wraps a pipeline with a single-flight guard and outcome accounting.
pub struct SeriesRefresher {
    pipeline: SeriesPipeline,
    in_flight: Mutex<()>,
    metrics: Metrics,
}

impl SeriesRefresher {
    pub fn new(pipeline: SeriesPipeline, metrics: Metrics) -> Self {
        Self {
            pipeline,
            in_flight: Mutex::new(()),
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        self.pipeline.name()
    }

    /// Run the pipeline unless a previous run of this series is still going.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!(
                "SeriesRefresher [{}]: Previous refresh still running, skipping tick",
                self.name()
            );
            self.metrics
                .record_refresh(self.name(), RefreshOutcome::Skipped);
            return RefreshOutcome::Skipped;
        };

        let outcome = match self.pipeline.run().await {
            Ok(summary) => {
                self.metrics
                    .add_malformed_rows(self.name(), summary.malformed);
                if summary.published > 0 {
                    RefreshOutcome::Success
                } else {
                    RefreshOutcome::NoData
                }
            }
            Err(e) => {
                if let PipelineError::StreamRead { published, .. } = &e {
                    if *published > 0 {
                        self.metrics.mark_published(self.name());
                    }
                }
                error!(
                    "SeriesRefresher [{}]: Refresh failed, keeping previous value: {}",
                    self.name(),
                    e
                );
                RefreshOutcome::Failed
            }
        };

        self.metrics.record_refresh(self.name(), outcome);
        outcome
    }
}

/// Drives every series: once up front, then on a fixed interval forever.
#[derive(Clone)]
pub struct RefreshScheduler {
    refreshers: Vec<Arc<SeriesRefresher>>,
    interval: Duration,
}

impl RefreshScheduler {
    /// Intervals above [`MAX_INTERVAL_SECS`] are clamped to it.
    pub fn new(refreshers: Vec<Arc<SeriesRefresher>>, interval: Duration) -> Self {
        Self {
            refreshers,
            interval: interval.min(Duration::from_secs(MAX_INTERVAL_SECS)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Refresh every series concurrently and wait for all of them.
    ///
    /// Returns outcomes in configuration order.
    pub async fn run_once(&self) -> Vec<(String, RefreshOutcome)> {
        let mut tasks = JoinSet::new();
        for (idx, refresher) in self.refreshers.iter().enumerate() {
            let refresher = refresher.clone();
            tasks.spawn(async move { (idx, refresher.refresh().await) });
        }

        let mut outcomes = vec![RefreshOutcome::Failed; self.refreshers.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => outcomes[idx] = outcome,
                Err(e) => error!("RefreshScheduler: Refresh task panicked: {}", e),
            }
        }

        self.refreshers
            .iter()
            .map(|r| r.name().to_string())
            .zip(outcomes)
            .collect()
    }

    /// Spawn the background loop. The first tick fires one interval from now.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "RefreshScheduler: Refreshing {} series every {:?}",
                self.refreshers.len(),
                self.interval
            );

            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                for refresher in &self.refreshers {
                    let refresher = refresher.clone();
                    tokio::spawn(async move {
                        refresher.refresh().await;
                    });
                }
            }
        })
    }
}
