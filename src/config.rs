//! Run options and their validation.
//!
//! [`Options`] mirrors the command line as plain values. [`Options::validate`]
//! checks them and builds the reader format and [`Extractor`] for the run,
//! before any input is opened.

use std::path::PathBuf;

use tracing::debug;

use crate::error::ExtractError;
use crate::range_spec::{ColumnOrder, IndexSet};
use crate::record_io::CsvFormat;
use crate::selection::{Extractor, SelectionMode};
use crate::time_span::TimeRange;

/// Raw options for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub delimiter: String,
    pub comment: String,
    pub loose: bool,
    pub columns: Option<String>,
    pub rows: Option<String>,
    pub time_span: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub time_column: Option<usize>,
    pub all: bool,
    pub header: bool,
    pub skip_blank: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            delimiter: ",".to_string(),
            comment: "#".to_string(),
            loose: false,
            columns: None,
            rows: None,
            time_span: None,
            from: None,
            to: None,
            time_column: None,
            all: false,
            header: false,
            skip_blank: None,
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: CsvFormat,
    pub extractor: Extractor,
}

impl Options {
    pub fn validate(&self) -> Result<RunConfig, ExtractError> {
        let format = CsvFormat {
            delimiter: single_byte("delimiter", &self.delimiter)?
                .ok_or_else(|| ExtractError::Config("delimiter must not be empty".to_string()))?,
            comment: single_byte("comment", &self.comment)?,
            flexible: self.loose,
        };
        if format.comment == Some(format.delimiter) {
            return Err(ExtractError::Config(
                "comment character must differ from the delimiter".to_string(),
            ));
        }

        let mode = self.selection_mode()?;
        debug!(mode = mode.name(), "selection mode chosen");

        let mut extractor = Extractor::new(mode).header(self.header);

        // An empty column list means all columns.
        if let Some(spec) = self.columns.as_deref().filter(|s| !s.trim().is_empty()) {
            extractor = extractor.columns(ColumnOrder::parse(spec).map_err(ExtractError::Columns)?);
        }
        if let Some(column) = self.skip_blank {
            extractor = extractor.skip_blank(column);
        }

        Ok(RunConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            format,
            extractor,
        })
    }

    fn selection_mode(&self) -> Result<SelectionMode, ExtractError> {
        let time_pair = self.from.is_some() || self.to.is_some();
        let chosen = [
            self.all,
            self.rows.is_some(),
            self.time_span.is_some(),
            time_pair,
        ]
        .iter()
        .filter(|&&b| b)
        .count();

        if chosen == 0 {
            return Err(ExtractError::Config(
                "choose one of --all, --rows, --time-span or --from/--to".to_string(),
            ));
        }
        if chosen > 1 {
            return Err(ExtractError::Config(
                "--all, --rows, --time-span and --from/--to are mutually exclusive".to_string(),
            ));
        }

        let is_time = self.time_span.is_some() || time_pair;
        if self.time_column.is_some() && !is_time {
            return Err(ExtractError::Config(
                "--time-column only applies to time selection".to_string(),
            ));
        }

        if self.all {
            return Ok(SelectionMode::AllRecords);
        }

        if let Some(spec) = &self.rows {
            let set = IndexSet::parse(spec).map_err(ExtractError::Rows)?;
            return Ok(SelectionMode::IndexRange(set));
        }

        let range = match (&self.time_span, &self.from, &self.to) {
            (Some(span), _, _) => TimeRange::parse_span(span)?,
            (None, Some(from), Some(to)) => TimeRange::parse_pair(from, to)?,
            _ => {
                return Err(ExtractError::Config(
                    "--from and --to must be given together".to_string(),
                ));
            }
        };
        Ok(SelectionMode::TimeRange {
            range,
            column: self.time_column,
        })
    }
}

/// Parse a one-character option into a byte. Empty means unset.
fn single_byte(name: &str, value: &str) -> Result<Option<u8>, ExtractError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) if c.is_ascii() => Ok(Some(c as u8)),
        _ => Err(ExtractError::Config(format!(
            "{name} must be a single ASCII character, got '{value}'"
        ))),
    }
}
