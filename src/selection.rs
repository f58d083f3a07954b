//! The selection engine.
//!
//! An [`Extractor`] pulls records from a [`RecordSource`] one at a time,
//! decides whether each one is emitted according to its [`SelectionMode`],
//! drops blank records, projects columns and writes the result to a
//! [`RecordSink`]. Each record is fully handled before the next is read.

use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::range_spec::{ColumnOrder, IndexSet};
use crate::record::Record;
use crate::record_io::{RecordSink, RecordSource};
use crate::time_span::{TimeRange, format_timestamp, parse_timestamp};

/// Which records a run emits. Exactly one mode is active per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every record.
    AllRecords,
    /// Records whose 0-based ordinal is in the set.
    IndexRange(IndexSet),
    /// Records carrying a timestamp inside the window. With `column` unset
    /// the first field that parses as a timestamp is used.
    TimeRange {
        range: TimeRange,
        column: Option<usize>,
    },
}

impl SelectionMode {
    pub fn name(&self) -> &str {
        match self {
            SelectionMode::AllRecords => "all",
            SelectionMode::IndexRange(_) => "rows",
            SelectionMode::TimeRange { .. } => "time",
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Records pulled from the source, header included.
    pub records_read: u64,
    /// Records handed to the sink, header included.
    pub records_written: u64,
    /// Matching records dropped for a blank field.
    pub blank_skipped: u64,
}

/// Streaming record filter.
///
/// ```
/// use csvslice::{Extractor, Record, SelectionMode, ColumnOrder};
///
/// let input = vec![
///     Record::from_fields(&["id", "name", "dept"]),
///     Record::from_fields(&["1", "smith", "sales"]),
/// ];
/// let mut source = input.into_iter();
/// let mut out: Vec<Record> = Vec::new();
///
/// Extractor::new(SelectionMode::AllRecords)
///     .columns(ColumnOrder::parse("2,0").unwrap())
///     .run(&mut source, &mut out)
///     .unwrap();
///
/// assert_eq!(out[1], Record::from_fields(&["sales", "1"]));
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    mode: SelectionMode,
    columns: Option<ColumnOrder>,
    blank_column: Option<usize>,
    header: bool,
}

impl Extractor {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            columns: None,
            blank_column: None,
            header: false,
        }
    }

    /// Emit only these columns, in this order.
    pub fn columns(mut self, order: ColumnOrder) -> Self {
        self.columns = Some(order);
        self
    }

    /// Drop matching records whose field at `column` is empty.
    pub fn skip_blank(mut self, column: usize) -> Self {
        self.blank_column = Some(column);
        self
    }

    /// Copy the first record through before selection starts.
    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    /// Run the selection over `source`, writing to `sink`.
    ///
    /// The sink is flushed whether or not the run succeeds.
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> Result<RunSummary, ExtractError>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
    {
        let mut run = Run {
            extractor: self,
            summary: RunSummary::default(),
            ordinal: 0,
        };

        let result = run.execute(source, sink);
        let flushed = sink.flush();
        let summary = result?;
        flushed?;

        info!(
            mode = self.mode.name(),
            read = summary.records_read,
            written = summary.records_written,
            blank_skipped = summary.blank_skipped,
            "extraction finished"
        );
        Ok(summary)
    }
}

/// State for a single pass over the input.
struct Run<'a> {
    extractor: &'a Extractor,
    summary: RunSummary,
    /// 0-based position of the next record, header excluded.
    ordinal: usize,
}

impl Run<'_> {
    fn execute<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunSummary, ExtractError>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
    {
        let extractor = self.extractor;

        if extractor.header
            && let Some(record) = self.read(source)?
        {
            self.emit(record, sink)?;
        }

        match &extractor.mode {
            SelectionMode::AllRecords => {
                debug!("selecting all records");
                while let Some(record) = self.read(source)? {
                    self.ordinal += 1;
                    self.offer(record, sink)?;
                }
            }
            SelectionMode::IndexRange(set) => {
                debug!(min = set.min(), max = set.max(), "selecting rows by ordinal");
                while self.ordinal <= set.max() {
                    let Some(record) = self.read(source)? else {
                        break;
                    };
                    let ordinal = self.ordinal;
                    self.ordinal += 1;

                    if ordinal >= set.min() && set.contains(ordinal) {
                        self.offer(record, sink)?;
                    }
                }
            }
            SelectionMode::TimeRange { range, column } => {
                debug!(
                    start = %format_timestamp(range.start()),
                    end = %format_timestamp(range.end()),
                    column = ?column,
                    "selecting rows by time"
                );
                while let Some(record) = self.read(source)? {
                    self.ordinal += 1;
                    if record_in_range(&record, *column, range, self.summary.records_read) {
                        self.offer(record, sink)?;
                    }
                }
            }
        }

        Ok(self.summary)
    }

    fn read<S>(&mut self, source: &mut S) -> Result<Option<Record>, ExtractError>
    where
        S: RecordSource + ?Sized,
    {
        let record = source.read_record()?;
        if record.is_some() {
            self.summary.records_read += 1;
        }
        Ok(record)
    }

    /// Apply blank suppression to a record that passed selection.
    fn offer<K>(&mut self, record: Record, sink: &mut K) -> Result<(), ExtractError>
    where
        K: RecordSink + ?Sized,
    {
        if let Some(column) = self.extractor.blank_column
            && record.is_blank(column)
        {
            self.summary.blank_skipped += 1;
            return Ok(());
        }
        self.emit(record, sink)
    }

    fn emit<K>(&mut self, record: Record, sink: &mut K) -> Result<(), ExtractError>
    where
        K: RecordSink + ?Sized,
    {
        let record = match &self.extractor.columns {
            Some(order) => record
                .project(order)
                .map_err(|e| ExtractError::out_of_range(self.summary.records_read, e))?,
            None => record,
        };
        sink.write_record(&record)?;
        self.summary.records_written += 1;
        Ok(())
    }
}

/// True when the record's timestamp lies within `range`.
///
/// A pinned column that does not parse is reported and counts as a miss.
/// Without a pinned column the first parseable field decides.
fn record_in_range(record: &Record, column: Option<usize>, range: &TimeRange, position: u64) -> bool {
    match column {
        Some(index) => {
            let Some(value) = record.field(index) else {
                warn!(record = position, column = index, "timestamp column missing");
                return false;
            };
            match parse_timestamp(value) {
                Ok(ts) => range.contains(&ts),
                Err(e) => {
                    warn!(record = position, column = index, "error parsing column time: {e}");
                    false
                }
            }
        }
        None => record
            .iter()
            .find_map(|field| parse_timestamp(field).ok())
            .is_some_and(|ts| range.contains(&ts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_io::{CsvFormat, CsvSink, CsvSource};

    const T_10: &str = "23/05/2016 10:00:00.000 +0000";
    const T_11: &str = "23/05/2016 11:00:00.000 +0000";
    const T_12: &str = "23/05/2016 12:00:00.000 +0000";
    const T_14: &str = "23/05/2016 14:00:00.000 +0000";
    const T_15: &str = "23/05/2016 15:00:00.000 +0000";

    /// Source that counts how many times it was read.
    struct CountingSource {
        records: std::vec::IntoIter<Record>,
        reads: usize,
    }

    impl CountingSource {
        fn new(records: Vec<Record>) -> Self {
            Self {
                records: records.into_iter(),
                reads: 0,
            }
        }
    }

    impl RecordSource for CountingSource {
        fn read_record(&mut self) -> Result<Option<Record>, ExtractError> {
            self.reads += 1;
            Ok(self.records.next())
        }
    }

    /// Source that fails after yielding its records.
    struct FailingSource {
        records: std::vec::IntoIter<Record>,
    }

    impl RecordSource for FailingSource {
        fn read_record(&mut self) -> Result<Option<Record>, ExtractError> {
            match self.records.next() {
                Some(r) => Ok(Some(r)),
                None => Err(ExtractError::Io(std::io::Error::other("disk gone"))),
            }
        }
    }

    /// Sink that remembers whether it was flushed.
    #[derive(Default)]
    struct FlushTracker {
        records: Vec<Record>,
        flushed: bool,
    }

    impl RecordSink for FlushTracker {
        fn write_record(&mut self, record: &Record) -> Result<(), ExtractError> {
            self.records.push(record.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ExtractError> {
            self.flushed = true;
            Ok(())
        }
    }

    fn numbered(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::from_fields(&[i.to_string(), format!("v{i}")]))
            .collect()
    }

    fn run(extractor: &Extractor, input: Vec<Record>) -> (Vec<Record>, RunSummary) {
        let mut out: Vec<Record> = Vec::new();
        let summary = extractor.run(&mut input.into_iter(), &mut out).unwrap();
        (out, summary)
    }

    fn first_fields(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.field(0).unwrap()).collect()
    }

    fn time_mode(column: Option<usize>) -> SelectionMode {
        SelectionMode::TimeRange {
            range: TimeRange::parse_pair(T_11, T_14).unwrap(),
            column,
        }
    }

    #[test]
    fn test_all_records_passthrough() {
        let (out, summary) = run(&Extractor::new(SelectionMode::AllRecords), numbered(4));
        assert_eq!(out, numbered(4));
        assert_eq!(summary.records_read, 4);
        assert_eq!(summary.records_written, 4);
    }

    #[test]
    fn test_empty_input() {
        let extractor = Extractor::new(SelectionMode::AllRecords).header(true);
        let (out, summary) = run(&extractor, vec![]);
        assert!(out.is_empty());
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_index_range_stops_after_max() {
        let set = IndexSet::from_indices([2, 4]).unwrap();
        let extractor = Extractor::new(SelectionMode::IndexRange(set));
        let mut source = CountingSource::new(numbered(6));
        let mut out: Vec<Record> = Vec::new();

        let summary = extractor.run(&mut source, &mut out).unwrap();

        assert_eq!(first_fields(&out), vec!["2", "4"]);
        assert_eq!(source.reads, 5);
        assert_eq!(summary.records_read, 5);
    }

    #[test]
    fn test_index_range_gap_members_skipped() {
        let set = IndexSet::parse("1,3-4").unwrap();
        let (out, _) = run(&Extractor::new(SelectionMode::IndexRange(set)), numbered(10));
        assert_eq!(first_fields(&out), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_index_range_short_input() {
        let set = IndexSet::parse("1-20").unwrap();
        let mut source = CountingSource::new(numbered(3));
        let mut out: Vec<Record> = Vec::new();
        let summary = Extractor::new(SelectionMode::IndexRange(set))
            .run(&mut source, &mut out)
            .unwrap();
        assert_eq!(first_fields(&out), vec!["1", "2"]);
        // Three records plus the read that hit end of stream.
        assert_eq!(source.reads, 4);
        assert_eq!(summary.records_read, 3);
    }

    #[test]
    fn test_index_range_header_not_counted() {
        let mut input = vec![Record::from_fields(&["id", "val"])];
        input.extend(numbered(5));
        let set = IndexSet::parse("0,2").unwrap();
        let extractor = Extractor::new(SelectionMode::IndexRange(set)).header(true);
        let (out, _) = run(&extractor, input);
        assert_eq!(first_fields(&out), vec!["id", "0", "2"]);
    }

    #[test]
    fn test_index_range_blank_still_advances() {
        let input = vec![
            Record::from_fields(&["0", "x"]),
            Record::from_fields(&["1", ""]),
            Record::from_fields(&["2", "y"]),
        ];
        let set = IndexSet::parse("1-2").unwrap();
        let extractor = Extractor::new(SelectionMode::IndexRange(set)).skip_blank(1);
        let (out, summary) = run(&extractor, input);
        assert_eq!(first_fields(&out), vec!["2"]);
        assert_eq!(summary.blank_skipped, 1);
    }

    #[test]
    fn test_time_range_auto_detect_inclusive() {
        let input = vec![
            Record::from_fields(&["a", T_10]),
            Record::from_fields(&["b", T_11]),
            Record::from_fields(&["c", T_12]),
            Record::from_fields(&["d", T_14]),
            Record::from_fields(&["e", T_15]),
        ];
        let (out, _) = run(&Extractor::new(time_mode(None)), input);
        assert_eq!(first_fields(&out), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_time_range_auto_detect_uses_first_parseable_field() {
        // The first timestamp decides even when a later one would match.
        let input = vec![
            Record::from_fields(&["x", T_10, T_12]),
            Record::from_fields(&["y", "junk", T_12]),
            Record::from_fields(&["z", "junk", "more junk"]),
        ];
        let (out, _) = run(&Extractor::new(time_mode(None)), input);
        assert_eq!(first_fields(&out), vec!["y"]);
    }

    #[test]
    fn test_time_range_pinned_column() {
        let input = vec![
            Record::from_fields(&[T_12, T_10]),
            Record::from_fields(&[T_10, T_12]),
            Record::from_fields(&[T_12, "not a time"]),
            Record::from_fields(&[T_12]),
        ];
        let (out, summary) = run(&Extractor::new(time_mode(Some(1))), input);
        assert_eq!(out, vec![Record::from_fields(&[T_10, T_12])]);
        assert_eq!(summary.records_read, 4);
    }

    #[test]
    fn test_time_range_does_not_stop_early() {
        let input = vec![
            Record::from_fields(&[T_15]),
            Record::from_fields(&[T_12]),
            Record::from_fields(&[T_10]),
            Record::from_fields(&[T_11]),
        ];
        let (out, _) = run(&Extractor::new(time_mode(Some(0))), input);
        assert_eq!(first_fields(&out), vec![T_12, T_11]);
    }

    #[test]
    fn test_header_bypasses_time_test_and_blank_check() {
        let input = vec![
            Record::from_fields(&["when", ""]),
            Record::from_fields(&[T_12, "ok"]),
            Record::from_fields(&[T_15, "late"]),
        ];
        let extractor = Extractor::new(time_mode(None)).header(true).skip_blank(1);
        let (out, summary) = run(&extractor, input);
        assert_eq!(first_fields(&out), vec!["when", T_12]);
        assert_eq!(summary.blank_skipped, 0);
    }

    #[test]
    fn test_blank_suppression_drops_exactly_one() {
        let input = vec![
            Record::from_fields(&["1", "a"]),
            Record::from_fields(&["2", ""]),
            Record::from_fields(&["3", "c"]),
        ];
        let plain = Extractor::new(SelectionMode::AllRecords);
        let suppressing = Extractor::new(SelectionMode::AllRecords).skip_blank(1);

        let (all, _) = run(&plain, input.clone());
        let (kept, summary) = run(&suppressing, input);

        assert_eq!(all.len() - kept.len(), 1);
        assert_eq!(first_fields(&kept), vec!["1", "3"]);
        assert_eq!(summary.blank_skipped, 1);
    }

    #[test]
    fn test_blank_suppression_missing_field_counts_as_blank() {
        let input = vec![Record::from_fields(&["1"]), Record::from_fields(&["2", "b"])];
        let (out, _) = run(&Extractor::new(SelectionMode::AllRecords).skip_blank(1), input);
        assert_eq!(first_fields(&out), vec!["2"]);
    }

    #[test]
    fn test_header_with_projection() {
        let input: Vec<Record> = (0..5)
            .map(|i| Record::from_fields(&[format!("a{i}"), format!("b{i}"), format!("c{i}")]))
            .collect();
        let extractor = Extractor::new(SelectionMode::AllRecords)
            .header(true)
            .columns(ColumnOrder::parse("0,2").unwrap());
        let (out, summary) = run(&extractor, input);

        assert_eq!(out.len(), 5);
        for (i, r) in out.iter().enumerate() {
            assert_eq!(r, &Record::from_fields(&[format!("a{i}"), format!("c{i}")]));
        }
        assert_eq!(summary.records_written, 5);
    }

    #[test]
    fn test_projection_keeps_requested_order() {
        let input = vec![Record::from_fields(&["a", "b", "c"])];
        let extractor =
            Extractor::new(SelectionMode::AllRecords).columns(ColumnOrder::parse("2,0").unwrap());
        let (out, _) = run(&extractor, input);
        assert_eq!(out, vec![Record::from_fields(&["c", "a"])]);
    }

    #[test]
    fn test_projection_out_of_range_reports_position() {
        let input = vec![
            Record::from_fields(&["a", "b", "c"]),
            Record::from_fields(&["d", "e"]),
        ];
        let extractor =
            Extractor::new(SelectionMode::AllRecords).columns(ColumnOrder::parse("0,2").unwrap());
        let mut sink = FlushTracker::default();
        let err = extractor
            .run(&mut input.into_iter(), &mut sink)
            .unwrap_err();

        match err {
            ExtractError::ColumnOutOfRange { record, index, len } => {
                assert_eq!((record, index, len), (2, 2, 2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sink.records.len(), 1);
        assert!(sink.flushed);
    }

    #[test]
    fn test_read_error_is_fatal_and_flushes() {
        let mut source = FailingSource {
            records: numbered(2).into_iter(),
        };
        let mut sink = FlushTracker::default();
        let err = Extractor::new(SelectionMode::AllRecords)
            .run(&mut source, &mut sink)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
        assert_eq!(sink.records.len(), 2);
        assert!(sink.flushed);
    }

    #[test]
    fn test_extractor_is_reusable() {
        let set = IndexSet::parse("1").unwrap();
        let extractor = Extractor::new(SelectionMode::IndexRange(set));
        let (first, _) = run(&extractor, numbered(3));
        let (second, _) = run(&extractor, numbered(3));
        assert_eq!(first, second);
    }

    #[test]
    fn test_csv_end_to_end() {
        let input = "id,name,dept\n1,smith,sales\n# skipped\n2,jones,\n3,doe,sales\n";
        let format = CsvFormat::default();
        let mut source = CsvSource::new(input.as_bytes(), &format);
        let mut sink = CsvSink::new(Vec::new(), &format);

        Extractor::new(SelectionMode::AllRecords)
            .header(true)
            .skip_blank(2)
            .columns(ColumnOrder::parse("1,0").unwrap())
            .run(&mut source, &mut sink)
            .unwrap();

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(text, "name,id\nsmith,1\ndoe,3\n");
    }
}
