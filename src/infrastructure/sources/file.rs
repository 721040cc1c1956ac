use crate::domain::errors::SourceError;
use crate::domain::ports::{SourceReader, SourceStream};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::BufReader;

/// Reads a series download from the local filesystem.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    timeout: Duration,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P, timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout,
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceReader for FileSource {
    async fn open(&self) -> Result<SourceStream, SourceError> {
        let file = match tokio::time::timeout(self.timeout, tokio::fs::File::open(&self.path)).await
        {
            Ok(Ok(file)) => file,
            Ok(Err(e)) => {
                return Err(SourceError::Open {
                    locator: self.describe(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(SourceError::Timeout {
                    locator: self.describe(),
                    duration_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        Ok(Box::pin(BufReader::new(file)))
    }

    fn describe(&self) -> String {
        format!("file: {}", self.path.display())
    }
}
