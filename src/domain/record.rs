use crate::domain::errors::MalformedValue;
use crate::domain::series::{MISSING_VALUE_SENTINEL, Observation};

/// Result of interpreting one line from the data section.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// A publishable observation
    Value(Observation),
    /// The period carries the missing-value sentinel
    Missing { date: String },
    /// Not a two-field row (blank lines, stray formatting)
    Skipped,
    /// Two fields, but the value is not a finite number. A whitespace-only
    /// line lands here too, as two empty fields.
    Malformed(MalformedValue),
}

/// Parse a data-section line of the form `<date><whitespace><value>`.
pub fn parse_record(line: &str) -> RecordOutcome {
    let fields = split_fields(line);
    let [date, value] = fields.as_slice() else {
        return RecordOutcome::Skipped;
    };

    if *value == MISSING_VALUE_SENTINEL {
        return RecordOutcome::Missing {
            date: date.to_string(),
        };
    }

    let malformed = |reason: String| {
        RecordOutcome::Malformed(MalformedValue {
            date: date.to_string(),
            value: value.to_string(),
            reason,
        })
    };

    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_infinite() && !is_infinity_literal(value) => {
            malformed("value out of range".to_string())
        }
        Ok(parsed) => RecordOutcome::Value(Observation {
            date: date.to_string(),
            value: parsed,
        }),
        Err(e) => malformed(e.to_string()),
    }
}

/// `inf` / `infinity` with an optional sign, any case.
fn is_infinity_literal(token: &str) -> bool {
    let unsigned = token.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Split on runs of ASCII whitespace.
///
/// Leading or trailing whitespace produces an empty first or last field, so
/// an indented row counts as three fields rather than two.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(2);
    let mut start = 0;
    let mut in_gap = false;

    for (idx, ch) in line.char_indices() {
        if ch.is_ascii_whitespace() {
            if !in_gap {
                fields.push(&line[start..idx]);
                in_gap = true;
            }
        } else if in_gap {
            start = idx;
            in_gap = false;
        }
    }

    if in_gap {
        fields.push("");
    } else {
        fields.push(&line[start..]);
    }
    fields
}
