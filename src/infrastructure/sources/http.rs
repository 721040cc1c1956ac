use crate::domain::errors::SourceError;
use crate::domain::ports::{SourceReader, SourceStream};
use async_trait::async_trait;
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches a series download over HTTP(S).
///
/// The body is read in full under the deadline, so a stalled server can never
/// hold the refresh past `timeout`.
pub struct HttpSource {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }

    async fn fetch(&self) -> Result<SourceStream, SourceError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                locator: self.describe(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);

        Ok(Box::pin(Cursor::new(body)))
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                locator: self.describe(),
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else {
            SourceError::Transport {
                locator: self.describe(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl SourceReader for HttpSource {
    async fn open(&self) -> Result<SourceStream, SourceError> {
        match tokio::time::timeout(self.timeout, self.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                locator: self.describe(),
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
