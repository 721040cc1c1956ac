/// Where the scanner is within a series download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    SeekingHeader, // Title and notes preceding the data block
    InData,        // Every line after the header marker
}

/// Line-by-line state machine separating the prose preamble from the data block.
///
/// The transition is one-way: once the header marker has been seen, every
/// following line is data until the stream ends.
#[derive(Debug, Clone)]
pub struct DataSectionScanner {
    header_marker: String,
    state: ScanState,
    data_lines: usize,
}

impl DataSectionScanner {
    pub fn new(header_marker: impl Into<String>) -> Self {
        Self {
            header_marker: header_marker.into(),
            state: ScanState::SeekingHeader,
            data_lines: 0,
        }
    }

    /// Feed one line (without its terminator).
    ///
    /// Returns the line back if it belongs to the data section, `None` if it is
    /// preamble or the header itself.
    pub fn feed<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        match self.state {
            ScanState::SeekingHeader => {
                if line == self.header_marker {
                    self.state = ScanState::InData;
                }
                None
            }
            ScanState::InData => {
                self.data_lines += 1;
                Some(line)
            }
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn header_found(&self) -> bool {
        self.state == ScanState::InData
    }

    /// Lines handed out as data so far
    pub fn data_lines(&self) -> usize {
        self.data_lines
    }
}

/// Strip the line terminator left by `read_line`.
pub fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::DEFAULT_HEADER_MARKER;

    #[test]
    fn test_preamble_is_suppressed() {
        let mut scanner = DataSectionScanner::new(DEFAULT_HEADER_MARKER);
        assert_eq!(scanner.feed("Title:  30-Year Fixed Rate Mortgage Average"), None);
        assert_eq!(scanner.feed("2024-01-05  6.62"), None);
        assert_eq!(scanner.state(), ScanState::SeekingHeader);
    }

    #[test]
    fn test_header_switches_to_data_and_is_discarded() {
        let mut scanner = DataSectionScanner::new(DEFAULT_HEADER_MARKER);
        assert_eq!(scanner.feed("DATE        VALUE"), None);
        assert!(scanner.header_found());
        assert_eq!(scanner.feed("2024-01-05  6.62"), Some("2024-01-05  6.62"));
        assert_eq!(scanner.data_lines(), 1);
    }

    #[test]
    fn test_no_transition_back_to_seeking() {
        let mut scanner = DataSectionScanner::new(DEFAULT_HEADER_MARKER);
        scanner.feed("DATE        VALUE");
        assert_eq!(scanner.feed(""), Some(""));
        assert_eq!(scanner.feed("DATE        VALUE"), Some("DATE        VALUE"));
        assert_eq!(scanner.state(), ScanState::InData);
        assert_eq!(scanner.data_lines(), 2);
    }

    #[test]
    fn test_header_match_is_exact() {
        let mut scanner = DataSectionScanner::new(DEFAULT_HEADER_MARKER);
        scanner.feed("DATE VALUE");
        scanner.feed(" DATE        VALUE");
        scanner.feed("DATE        VALUE ");
        assert!(!scanner.header_found());
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending("DATE        VALUE\r\n"), "DATE        VALUE");
        assert_eq!(trim_line_ending("2024-01-05  6.62\n"), "2024-01-05  6.62");
        assert_eq!(trim_line_ending("no terminator"), "no terminator");
    }
}
