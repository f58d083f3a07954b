//! Record type: one row of string fields.

use crate::error::ProjectError;
use crate::range_spec::ColumnOrder;

/// An ordered sequence of fields read from one row of input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Build a record from string slices. Handy in tests.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// True when the field at `index` is empty or missing.
    pub fn is_blank(&self, index: usize) -> bool {
        self.field(index).is_none_or(str::is_empty)
    }

    /// Build a new record from the columns in `order`, in that order.
    ///
    /// Columns may repeat. Fails on the first index past the end of the
    /// record.
    pub fn project(&self, order: &ColumnOrder) -> Result<Record, ProjectError> {
        let fields = order
            .indices()
            .iter()
            .map(|&index| {
                self.fields.get(index).cloned().ok_or(ProjectError {
                    index,
                    len: self.fields.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Record { fields })
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

/// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
impl From<&csv::ByteRecord> for Record {
    fn from(rec: &csv::ByteRecord) -> Self {
        Self {
            fields: rec
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect(),
        }
    }
}
