//! Source readers for series downloads.
//!
//! A series is either fetched over HTTP(S) or read from a local file; both
//! hand back a buffered line stream behind the [`SourceReader`] port.

mod file;
mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::domain::ports::SourceReader;
use crate::domain::series::SourceLocator;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Build the reader matching a locator.
pub fn reader_for(
    locator: &SourceLocator,
    client: &Client,
    timeout: Duration,
) -> Arc<dyn SourceReader> {
    match locator {
        SourceLocator::Url(url) => Arc::new(HttpSource::new(client.clone(), url.clone(), timeout)),
        SourceLocator::Path(path) => Arc::new(FileSource::new(path, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_for_picks_implementation() {
        let client = Client::new();
        let timeout = Duration::from_secs(1);

        let http = reader_for(
            &SourceLocator::parse("https://fred.stlouisfed.org/data/MORTGAGE30US.txt"),
            &client,
            timeout,
        );
        assert_eq!(
            http.describe(),
            "https://fred.stlouisfed.org/data/MORTGAGE30US.txt"
        );

        let file = reader_for(&SourceLocator::parse("data/series.txt"), &client, timeout);
        assert_eq!(file.describe(), "file: data/series.txt");
    }

    #[test]
    fn test_path_reader_surfaces_open_failure() {
        let reader = reader_for(
            &SourceLocator::parse("/nonexistent/MORTGAGE30US.txt"),
            &Client::new(),
            Duration::from_secs(1),
        );
        assert!(tokio_test::block_on(reader.open()).is_err());
    }
}
