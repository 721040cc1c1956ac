use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Header line that opens the data block of a FRED text download.
pub const DEFAULT_HEADER_MARKER: &str = "DATE        VALUE";

/// Token FRED uses for "no observation this period".
pub const MISSING_VALUE_SENTINEL: &str = ".";

/// Where a series' text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Url(Url),
    Path(PathBuf),
}

impl SourceLocator {
    /// Interpret a configured location string.
    ///
    /// Anything that parses as an `http`/`https` URL is fetched over the network,
    /// `file://` URLs and everything else are treated as filesystem paths.
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Self::Url(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Path(path),
                Err(_) => Self::Path(PathBuf::from(raw)),
            },
            _ => Self::Path(PathBuf::from(raw)),
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Static description of one tracked series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesDescriptor {
    /// Metric name the latest value is published under
    pub metric_name: String,
    /// Human-readable help text for the metric
    pub help: String,
    pub source: SourceLocator,
    /// Exact line that starts the data section
    pub header_marker: String,
}

impl SeriesDescriptor {
    pub fn new(
        metric_name: impl Into<String>,
        help: impl Into<String>,
        source: SourceLocator,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            help: help.into(),
            source,
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
        }
    }

    pub fn with_header_marker(mut self, marker: impl Into<String>) -> Self {
        self.header_marker = marker.into();
        self
    }

    /// The two FRED mortgage series exported when no series file is configured.
    pub fn fred_defaults() -> Vec<Self> {
        vec![
            Self::new(
                "mortgage30us",
                "30-Year Fixed Rate Mortgage Average in the United States",
                SourceLocator::parse("https://fred.stlouisfed.org/data/MORTGAGE30US.txt"),
            ),
            Self::new(
                "fha_mortgage30",
                "30-Year Fixed Rate FHA Mortgage Index",
                SourceLocator::parse("https://fred.stlouisfed.org/data/OBMMIFHA30YF.txt"),
            ),
        ]
    }
}

/// A single parsed data row. Lives only until it has been published.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: String,
    pub value: f64,
}
