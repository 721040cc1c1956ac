//! Pull-based observability for ratewatch
//!
//! One registry per process holds the series gauges and the exporter's own
//! refresh metrics; an HTTP endpoint serves it to Prometheus scrapes.

pub mod metrics;
pub mod server;

pub use metrics::{Metrics, RefreshOutcome};
pub use server::MetricsServer;
