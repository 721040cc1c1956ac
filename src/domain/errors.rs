use thiserror::Error;

/// Errors raised while acquiring a series' text
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {locator} failed: {reason}")]
    Transport { locator: String, reason: String },

    #[error("Request to {locator} returned HTTP status {status}")]
    Status { locator: String, status: u16 },

    #[error("Failed to open {locator}: {reason}")]
    Open { locator: String, reason: String },

    #[error("Reading {locator} timed out after {duration_ms}ms")]
    Timeout { locator: String, duration_ms: u64 },
}

/// Errors that abandon a single pipeline run.
///
/// None of these are fatal to the process; the gauge keeps whatever value it held.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// `published` counts values already written to the gauge before the failure
    #[error("Stream read failed after {lines_read} lines: {reason}")]
    StreamRead {
        lines_read: usize,
        published: usize,
        reason: String,
    },
}

/// A data row whose value field is not a number. Logged and skipped.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Malformed value {value:?} for {date}: {reason}")]
pub struct MalformedValue {
    pub date: String,
    pub value: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_formatting() {
        let error = SourceError::Status {
            locator: "https://fred.stlouisfed.org/data/MORTGAGE30US.txt".to_string(),
            status: 503,
        };

        let msg = error.to_string();
        assert!(msg.contains("MORTGAGE30US"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_pipeline_error_wraps_source_error() {
        let error: PipelineError = SourceError::Timeout {
            locator: "series.txt".to_string(),
            duration_ms: 30000,
        }
        .into();

        let msg = error.to_string();
        assert!(msg.starts_with("Source unavailable"));
        assert!(msg.contains("30000ms"));
    }

    #[test]
    fn test_malformed_value_is_cloneable() {
        let error = MalformedValue {
            date: "2024-01-05".to_string(),
            value: "1e400".to_string(),
            reason: "number too large".to_string(),
        };

        assert_eq!(error.clone(), error);
    }

    #[test]
    fn test_malformed_value_formatting() {
        let error = MalformedValue {
            date: "2024-01-05".to_string(),
            value: "notanumber".to_string(),
            reason: "invalid float literal".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Malformed value \"notanumber\" for 2024-01-05: invalid float literal"
        );
    }
}
