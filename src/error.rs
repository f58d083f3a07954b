//! Error types for parsing, projection and extraction runs.

use thiserror::Error;

/// Errors produced while parsing a range spec such as `1,3-5,9`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeSpecError {
    #[error("range spec is empty")]
    Empty,

    #[error("invalid number '{token}'")]
    InvalidNumber { token: String },

    #[error("invalid range '{token}', expected lo-hi")]
    InvalidRange { token: String },

    #[error("range '{token}' has its low bound above its high bound")]
    ReversedRange { token: String },
}

/// Errors produced while parsing timestamps or a time span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeSpanError {
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("timestamp '{0}' does not match DD/MM/YYYY HH:MM:SS.mmm +HHMM")]
    BadLayout(String),

    #[error("time span '{0}' has no '-' between its two timestamps")]
    MissingSeparator(String),
}

/// A column index that does not exist in the record being projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("column {index} out of range for record with {len} fields")]
pub struct ProjectError {
    pub index: usize,
    pub len: usize,
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("column list: {0}")]
    Columns(#[source] RangeSpecError),

    #[error("row list: {0}")]
    Rows(#[source] RangeSpecError),

    #[error("time span: {0}")]
    TimeSpan(#[from] TimeSpanError),

    #[error("record {record}: column {index} out of range ({len} fields)")]
    ColumnOutOfRange {
        record: u64,
        index: usize,
        len: usize,
    },

    #[error("error reading record: {0}")]
    Read(#[source] csv::Error),

    #[error("error writing record: {0}")]
    Write(#[source] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub(crate) fn out_of_range(record: u64, err: ProjectError) -> Self {
        ExtractError::ColumnOutOfRange {
            record,
            index: err.index,
            len: err.len,
        }
    }
}
