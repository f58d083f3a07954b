//! # csvslice
//!
//! Streaming extraction of rows and columns from large delimited text files.
//!
//! Records are read one at a time, tested against a single selection mode,
//! optionally reduced to a list of columns, and written straight back out.
//! Nothing beyond the current record is held in memory, so multi-million row
//! files go through in a single pass.
//!
//! ## Selection modes
//!
//! - **All records**: pass everything through (useful with column projection).
//! - **Row ranges**: keep records whose 0-based ordinal is listed in a range
//!   spec such as `0-99,250`. Reading stops after the highest listed ordinal.
//! - **Time window**: keep records carrying a timestamp in the inclusive
//!   window, either in a pinned column or the first field that parses.
//!
//! Any mode can be combined with header pass-through, blank-field suppression
//! and column projection.
//!
//! ## Example
//!
//! ```
//! use csvslice::{CsvFormat, CsvSink, CsvSource, Extractor, IndexSet, SelectionMode};
//!
//! let input = "id,name\n0,a\n1,b\n2,c\n3,d\n";
//! let format = CsvFormat::default();
//! let mut source = CsvSource::new(input.as_bytes(), &format);
//! let mut sink = CsvSink::new(Vec::new(), &format);
//!
//! let rows = IndexSet::parse("1-2").unwrap();
//! let summary = Extractor::new(SelectionMode::IndexRange(rows))
//!     .header(true)
//!     .run(&mut source, &mut sink)
//!     .unwrap();
//!
//! let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
//! assert_eq!(output, "id,name\n1,b\n2,c\n");
//! assert_eq!(summary.records_written, 3);
//! ```

pub mod config;
pub mod error;
pub mod range_spec;
pub mod record;
pub mod record_io;
pub mod selection;
pub mod time_span;

pub use config::{Options, RunConfig};
pub use error::{ExtractError, ProjectError, RangeSpecError, TimeSpanError};
pub use range_spec::{ColumnOrder, IndexSet, parse_range_spec, parse_ranges};
pub use record::Record;
pub use record_io::{CsvFormat, CsvSink, CsvSource, RecordSink, RecordSource};
pub use selection::{Extractor, RunSummary, SelectionMode};
pub use time_span::{
    TIMESTAMP_FORMAT, TimeRange, Timestamp, format_timestamp, parse_time_span, parse_timestamp,
};
