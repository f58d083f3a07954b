//! Timestamp parsing and inclusive time windows.
//!
//! Timestamps use one fixed layout, `DD/MM/YYYY HH:MM:SS.mmm ±HHMM`, for
//! example `23/05/2016 11:00:00.000 +0000`.

use chrono::{DateTime, FixedOffset};

use crate::error::TimeSpanError;

/// chrono layout for the fixed timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.3f %z";

pub type Timestamp = DateTime<FixedOffset>;

/// Byte width of a timestamp in the fixed layout.
pub const TIMESTAMP_LEN: usize = 29;

/// True when `value` has the exact shape `DD/MM/YYYY HH:MM:SS.mmm ±HHMM`.
///
/// chrono accepts narrower fields, a missing fraction and `+HH:MM`, so the
/// widths are checked here first.
fn has_timestamp_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == TIMESTAMP_LEN
        && bytes.iter().enumerate().all(|(i, &b)| match i {
            2 | 5 => b == b'/',
            10 | 23 => b == b' ',
            13 | 16 => b == b':',
            19 => b == b'.',
            24 => b == b'+' || b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a single timestamp in the fixed layout.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, TimeSpanError> {
    if !has_timestamp_shape(value) {
        return Err(TimeSpanError::BadLayout(value.to_string()));
    }
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        TimeSpanError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Render a timestamp back in the fixed layout.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a `<timestamp>-<timestamp>` string into its two halves, unsorted.
///
/// Offsets such as `-0500` contain a hyphen themselves, so the split is made
/// at the first hyphen where both sides parse as timestamps.
pub fn parse_time_span(span: &str) -> Result<(Timestamp, Timestamp), TimeSpanError> {
    let mut first_split = None;

    for (idx, _) in span.match_indices('-') {
        let (left, right) = (span[..idx].trim(), span[idx + 1..].trim());
        if let (Ok(start), Ok(end)) = (parse_timestamp(left), parse_timestamp(right)) {
            return Ok((start, end));
        }
        first_split.get_or_insert((left, right));
    }

    let Some((left, right)) = first_split else {
        return Err(TimeSpanError::MissingSeparator(span.to_string()));
    };

    // Report whichever half of the first split is broken.
    parse_timestamp(left)?;
    parse_timestamp(right)?;
    Err(TimeSpanError::MissingSeparator(span.to_string()))
}

/// An inclusive window of instants. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Build a window from two instants given in either order.
    pub fn new(a: Timestamp, b: Timestamp) -> Self {
        if b < a {
            TimeRange { start: b, end: a }
        } else {
            TimeRange { start: a, end: b }
        }
    }

    /// Parse the legacy hyphen-joined form.
    pub fn parse_span(span: &str) -> Result<Self, TimeSpanError> {
        let (a, b) = parse_time_span(span)?;
        Ok(Self::new(a, b))
    }

    /// Parse two separately supplied timestamps.
    pub fn parse_pair(from: &str, to: &str) -> Result<Self, TimeSpanError> {
        Ok(Self::new(parse_timestamp(from)?, parse_timestamp(to)?))
    }

    pub fn start(&self) -> &Timestamp {
        &self.start
    }

    pub fn end(&self) -> &Timestamp {
        &self.end
    }

    /// True when `ts` lies within the window, both ends included.
    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.start <= *ts && *ts <= self.end
    }
}
