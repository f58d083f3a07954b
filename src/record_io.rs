//! Record sources and sinks.
//!
//! The extractor only sees [`RecordSource`] and [`RecordSink`]. The CSV
//! implementations here wrap the `csv` crate; tests use in-memory ones.

use std::io::{Read, Write};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};

use crate::Record;
use crate::error::ExtractError;

/// Produces records one at a time until exhausted.
pub trait RecordSource {
    /// Read the next record. `Ok(None)` marks a clean end of stream.
    fn read_record(&mut self) -> Result<Option<Record>, ExtractError>;
}

/// Accepts records and appends them to an output stream.
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), ExtractError>;

    /// Push buffered output to the underlying writer.
    fn flush(&mut self) -> Result<(), ExtractError> {
        Ok(())
    }
}

/// Any iterator of records is a source.
impl<I> RecordSource for I
where
    I: Iterator<Item = Record>,
{
    fn read_record(&mut self) -> Result<Option<Record>, ExtractError> {
        Ok(self.next())
    }
}

/// Tokenizer settings shared by the CSV reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    pub delimiter: u8,
    /// Lines starting with this byte are skipped by the reader.
    pub comment: Option<u8>,
    /// Accept records whose field count differs from the first record.
    pub flexible: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: Some(b'#'),
            flexible: false,
        }
    }
}

/// [`RecordSource`] over any `Read`, tokenized by the `csv` crate.
///
/// No row is treated as a header here; header handling belongs to the
/// extractor. Fields that are not valid UTF-8 are decoded lossily.
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
    buf: ByteRecord,
}

impl<R: Read> CsvSource<R> {
    pub fn new(rdr: R, format: &CsvFormat) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(format.delimiter)
            .comment(format.comment)
            .flexible(format.flexible)
            .from_reader(rdr);
        Self {
            reader,
            buf: ByteRecord::new(),
        }
    }
}

impl<R: Read> RecordSource for CsvSource<R> {
    fn read_record(&mut self) -> Result<Option<Record>, ExtractError> {
        let more = self
            .reader
            .read_byte_record(&mut self.buf)
            .map_err(ExtractError::Read)?;
        if more {
            Ok(Some(Record::from(&self.buf)))
        } else {
            Ok(None)
        }
    }
}

/// [`RecordSink`] over any `Write`, serialized by the `csv` crate.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(wtr: W, format: &CsvFormat) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(format.delimiter)
            .flexible(true)
            .from_writer(wtr);
        Self { writer }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, ExtractError> {
        self.writer
            .into_inner()
            .map_err(|e| ExtractError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), ExtractError> {
        self.writer
            .write_record(record.fields())
            .map_err(ExtractError::Write)
    }

    fn flush(&mut self) -> Result<(), ExtractError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects written records in memory.
impl RecordSink for Vec<Record> {
    fn write_record(&mut self, record: &Record) -> Result<(), ExtractError> {
        self.push(record.clone());
        Ok(())
    }
}
