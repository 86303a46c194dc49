//! Row ordering.

use std::cmp::Ordering;

use once_cell::unsync::OnceCell;

use crate::column::Columns;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::pattern::{compile_strict, IntoPatterns, Pattern};
use crate::row::Row;
use crate::source::{RowIter, Source};
use crate::value::{norm, parse_number};

/// Sorts rows by the values of the columns matching a list of patterns.
///
/// Keys are taken from the first column matching each pattern, in
/// pattern order; with no patterns every column is a key, left to right.
/// Numbers sort before text and compare numerically, text compares
/// case- and whitespace-insensitively, and blank cells come last. The
/// sort is stable, and `reverse` flips the whole order.
///
/// The upstream is read once, on first access.
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["#adm1", "#affected"],
///     vec!["Coast", "300"],
///     vec!["Hills", "45"],
///     vec!["Plains", "1200"],
/// ])
/// .unwrap();
/// let sorted = data.sort("#affected", true).unwrap();
/// assert_eq!(sorted.values("#adm1").unwrap(), vec!["Plains", "Coast", "Hills"]);
/// ```
#[derive(Debug)]
pub struct SortFilter<S> {
    source: S,
    patterns: Vec<Pattern>,
    reverse: bool,
    sorted: OnceCell<Vec<Row>>,
}

/// One cell as a sort key.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Blank,
}

impl SortKey {
    fn of(value: Option<&str>) -> SortKey {
        let Some(value) = value else {
            return SortKey::Blank;
        };
        if let Some(n) = parse_number(value) {
            return SortKey::Number(n);
        }
        match norm(Some(value)) {
            Some(text) => SortKey::Text(text),
            None => SortKey::Blank,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Blank => 2,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl<S: Source> SortFilter<S> {
    /// Wraps `source`. Patterns are compiled strictly.
    pub fn new<P: IntoPatterns>(source: S, patterns: P, reverse: bool) -> Result<Self> {
        Ok(SortFilter {
            source,
            patterns: compile_strict(patterns)?,
            reverse,
            sorted: OnceCell::new(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Upstream positions of the key columns, in key order.
    fn key_indices(&self, columns: &Columns) -> Vec<usize> {
        if self.patterns.is_empty() {
            return (0..columns.len()).collect();
        }
        self.patterns
            .iter()
            .filter_map(|pattern| {
                columns
                    .iter()
                    .position(|column| pattern.matches_opt(column.as_ref()))
            })
            .collect()
    }

    fn sorted_rows(&self) -> Result<&Vec<Row>> {
        self.sorted.get_or_try_init(|| {
            let indices = self.key_indices(&self.source.columns()?);
            let mut keyed: Vec<(Vec<SortKey>, Row)> = Vec::new();
            for row in self.source.iter()? {
                let row = row?;
                let key = indices.iter().map(|&i| SortKey::of(row.value(i))).collect();
                keyed.push((key, row));
            }
            keyed.sort_by(|(a, _), (b, _)| {
                let ordering = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| x.compare(y))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal);
                if self.reverse {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
            tracing::debug!(rows = keyed.len(), keys = indices.len(), "sorted rows");
            Ok(keyed.into_iter().map(|(_, row)| row).collect())
        })
    }
}

impl<S: Source> Source for SortFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.source.columns()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        Ok(Box::new(self.sorted_rows()?.iter().cloned().map(Ok)))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
