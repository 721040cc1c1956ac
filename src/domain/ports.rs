use crate::domain::errors::SourceError;
use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncBufRead;

/// Buffered line stream handed back by a [`SourceReader`].
///
/// Owned by the caller; dropping it releases the file handle or response body.
pub type SourceStream = Pin<Box<dyn AsyncBufRead + Send>>;

// Need async_trait for async functions in traits
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Open the source. One network call or file open per invocation, no retries.
    async fn open(&self) -> Result<SourceStream, SourceError>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

/// Terminal side of the pipeline: a single overwritable value.
pub trait GaugeSink: Send + Sync {
    fn set(&self, value: f64);
    fn get(&self) -> f64;
}

impl GaugeSink for prometheus::Gauge {
    fn set(&self, value: f64) {
        prometheus::Gauge::set(self, value);
    }

    fn get(&self) -> f64 {
        prometheus::Gauge::get(self)
    }
}
