use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::errors::PipelineError;
use crate::domain::ports::{GaugeSink, SourceReader};
use crate::domain::record::{RecordOutcome, parse_record};
use crate::domain::scanner::{DataSectionScanner, trim_line_ending};
use crate::domain::series::{Observation, SeriesDescriptor};

/// What a single run saw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub lines_read: usize,
    pub header_found: bool,
    /// Values written to the sink, in stream order
    pub published: usize,
    pub missing: usize,
    pub skipped: usize,
    pub malformed: usize,
    /// The observation the sink now holds, if this run wrote one
    pub last: Option<Observation>,
}

/// Fetch → scan → parse → publish for one series.
///
/// Holds no state between runs; the sink keeps the last published value.
pub struct SeriesPipeline {
    descriptor: SeriesDescriptor,
    source: Arc<dyn SourceReader>,
    sink: Arc<dyn GaugeSink>,
    read_deadline: Option<Duration>,
}

impl SeriesPipeline {
    pub fn new(
        descriptor: SeriesDescriptor,
        source: Arc<dyn SourceReader>,
        sink: Arc<dyn GaugeSink>,
    ) -> Self {
        Self {
            descriptor,
            source,
            sink,
            read_deadline: None,
        }
    }

    /// Bound the time spent reading lines once the source is open.
    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = Some(deadline);
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.metric_name
    }

    pub fn descriptor(&self) -> &SeriesDescriptor {
        &self.descriptor
    }

    /// Run the pipeline once.
    ///
    /// A source failure returns before anything is written. A read failure
    /// mid-stream keeps the values already published by this run.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        debug!(
            "SeriesPipeline [{}]: Reading {}",
            self.name(),
            self.source.describe()
        );
        let mut stream = self.source.open().await?;
        let deadline = self
            .read_deadline
            .and_then(|limit| Instant::now().checked_add(limit));

        let summary = publish_until(
            &mut stream,
            &self.descriptor.header_marker,
            self.sink.as_ref(),
            self.name(),
            deadline,
        )
        .await?;

        if !summary.header_found {
            warn!(
                "SeriesPipeline [{}]: Header {:?} not found in {} ({} lines), value left unchanged",
                self.name(),
                self.descriptor.header_marker,
                self.source.describe(),
                summary.lines_read
            );
        } else {
            info!(
                "SeriesPipeline [{}]: {} values published, {} missing, {} malformed",
                self.name(),
                summary.published,
                summary.missing,
                summary.malformed
            );
        }

        Ok(summary)
    }
}

/// Scan a line stream and push every parsed value into `sink` as it is read.
///
/// Later rows overwrite earlier ones, so the sink ends on the last value in
/// file order. Lines are read as bytes and decoded lossily, so a stray
/// non-UTF-8 byte only spoils its own line.
pub async fn publish_from_stream<R>(
    reader: &mut R,
    header_marker: &str,
    sink: &dyn GaugeSink,
    series: &str,
) -> Result<RunSummary, PipelineError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    publish_until(reader, header_marker, sink, series, None).await
}

async fn publish_until<R>(
    reader: &mut R,
    header_marker: &str,
    sink: &dyn GaugeSink,
    series: &str,
    deadline: Option<Instant>,
) -> Result<RunSummary, PipelineError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut scanner = DataSectionScanner::new(header_marker);
    let mut summary = RunSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = match deadline {
            Some(at) => match tokio::time::timeout_at(at, reader.read_until(b'\n', &mut buf)).await
            {
                Ok(read) => read,
                Err(_) => {
                    return Err(PipelineError::StreamRead {
                        lines_read: summary.lines_read,
                        published: summary.published,
                        reason: "read deadline exceeded".to_string(),
                    });
                }
            },
            None => reader.read_until(b'\n', &mut buf).await,
        };
        match read {
            Ok(0) => break,
            Ok(_) => summary.lines_read += 1,
            Err(e) => {
                return Err(PipelineError::StreamRead {
                    lines_read: summary.lines_read,
                    published: summary.published,
                    reason: e.to_string(),
                });
            }
        }

        let text = String::from_utf8_lossy(&buf);
        let Some(line) = scanner.feed(trim_line_ending(&text)) else {
            continue;
        };

        match parse_record(line) {
            RecordOutcome::Value(observation) => {
                sink.set(observation.value);
                info!("[{}] Value: {:.2} ({})", series, observation.value, observation.date);
                summary.published += 1;
                summary.last = Some(observation);
            }
            RecordOutcome::Missing { date } => {
                debug!("[{}] No observation for {}", series, date);
                summary.missing += 1;
            }
            RecordOutcome::Skipped => summary.skipped += 1,
            RecordOutcome::Malformed(err) => {
                warn!("[{}] Failed to parse value: {}", series, err);
                summary.malformed += 1;
            }
        }
    }

    summary.header_found = scanner.header_found();
    Ok(summary)
}
