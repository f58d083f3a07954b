//! Range spec parsing.
//!
//! A range spec is a comma-separated list of single indices and inclusive
//! `lo-hi` intervals, for example `1,3-5,9`. The same grammar serves two
//! purposes:
//!
//! - [`ColumnOrder`] keeps the expansion exactly as written, since it defines
//!   the order of output columns.
//! - [`IndexSet`] keeps the intervals themselves, merged and sorted, for
//!   selecting rows by ordinal. Wide ranges cost nothing to hold.

use crate::error::RangeSpecError;

/// Parse a range spec into inclusive `(lo, hi)` pairs, in the order written.
///
/// A single index `n` becomes `(n, n)`.
pub fn parse_ranges(spec: &str) -> Result<Vec<(usize, usize)>, RangeSpecError> {
    if spec.trim().is_empty() {
        return Err(RangeSpecError::Empty);
    }

    let mut out = Vec::new();

    for token in spec.split(',') {
        let token = token.trim();

        if token.contains('-') {
            let parts: Vec<&str> = token.split('-').collect();
            if parts.len() != 2 {
                return Err(RangeSpecError::InvalidRange {
                    token: token.to_string(),
                });
            }

            let lo = parse_index(parts[0])?;
            let hi = parse_index(parts[1])?;
            if lo > hi {
                return Err(RangeSpecError::ReversedRange {
                    token: token.to_string(),
                });
            }

            out.push((lo, hi));
        } else {
            let n = parse_index(token)?;
            out.push((n, n));
        }
    }

    Ok(out)
}

/// Expand a range spec into its indices, in the order they were written.
///
/// ```
/// use csvslice::parse_range_spec;
///
/// assert_eq!(parse_range_spec("1,3-5,9").unwrap(), vec![1, 3, 4, 5, 9]);
/// ```
pub fn parse_range_spec(spec: &str) -> Result<Vec<usize>, RangeSpecError> {
    Ok(parse_ranges(spec)?
        .into_iter()
        .flat_map(|(lo, hi)| lo..=hi)
        .collect())
}

fn parse_index(s: &str) -> Result<usize, RangeSpecError> {
    let s = s.trim();
    s.parse().map_err(|_| RangeSpecError::InvalidNumber {
        token: s.to_string(),
    })
}

/// Output column order. Duplicates and reordering are kept as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder(Vec<usize>);

impl ColumnOrder {
    pub fn parse(spec: &str) -> Result<Self, RangeSpecError> {
        parse_range_spec(spec).map(ColumnOrder)
    }

    /// Build from explicit indices. Returns `None` for an empty list.
    pub fn from_indices(indices: Vec<usize>) -> Option<Self> {
        if indices.is_empty() {
            None
        } else {
            Some(ColumnOrder(indices))
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Set of record ordinals to emit, held as sorted, disjoint, non-adjacent
/// inclusive intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet {
    ranges: Vec<(usize, usize)>,
}

impl IndexSet {
    pub fn parse(spec: &str) -> Result<Self, RangeSpecError> {
        Self::from_ranges(parse_ranges(spec)?).ok_or(RangeSpecError::Empty)
    }

    /// Build from indices in any order. Returns `None` for an empty list.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Option<Self> {
        Self::from_ranges(indices.into_iter().map(|i| (i, i)))
    }

    /// Build from inclusive `(lo, hi)` intervals in any order, overlapping or
    /// not. Returns `None` when there are none.
    pub fn from_ranges(ranges: impl IntoIterator<Item = (usize, usize)>) -> Option<Self> {
        let mut sorted: Vec<(usize, usize)> = ranges.into_iter().collect();
        sorted.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(sorted.len());
        for (lo, hi) in sorted {
            match merged.last_mut() {
                Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }

        if merged.is_empty() {
            None
        } else {
            Some(IndexSet { ranges: merged })
        }
    }

    pub fn min(&self) -> usize {
        self.ranges[0].0
    }

    pub fn max(&self) -> usize {
        self.ranges[self.ranges.len() - 1].1
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        let i = self.ranges.partition_point(|&(_, hi)| hi < ordinal);
        self.ranges.get(i).is_some_and(|&(lo, _)| lo <= ordinal)
    }

    /// The merged intervals, ascending.
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }
}
