//! Row selection.

use crate::column::Columns;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::predicate::{IntoPredicates, Predicate};
use crate::row::Row;
use crate::source::{RowIter, Source};

/// Keeps the rows that match any of its predicates (or, inverted, the
/// rows that match none of them).
///
/// Columns pass through untouched and rows are streamed: nothing is
/// evaluated until the cursor is advanced.
///
/// ```text
/// emit = (any predicate matches) XOR invert
/// ```
///
/// # Example
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["#org", "#sector", "#affected"],
///     vec!["UNICEF", "WASH", "1200"],
///     vec!["MSF", "Health", "300"],
///     vec!["IFRC", "Shelter", "5000"],
/// ])
/// .unwrap();
///
/// let picked = data
///     .by_ref()
///     .with_rows(["#sector=wash", "#affected>1000"])
///     .unwrap();
/// assert_eq!(picked.values("#org").unwrap(), vec!["UNICEF", "IFRC"]);
///
/// let rest = data.without_rows("#sector=wash").unwrap();
/// assert_eq!(rest.row_count().unwrap(), 2);
/// ```
#[derive(Debug)]
pub struct RowFilter<S> {
    source: S,
    predicates: Vec<Predicate>,
    invert: bool,
}

impl<S: Source> RowFilter<S> {
    /// Wraps `source`. Fails if a string predicate does not parse.
    pub fn new<P: IntoPredicates>(source: S, predicates: P, invert: bool) -> Result<Self> {
        let predicates = predicates.into_predicates()?;
        tracing::debug!(predicates = predicates.len(), invert, "building row filter");
        Ok(RowFilter {
            source,
            predicates,
            invert,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Decides whether a row is emitted.
    pub fn accepts(&self, row: &Row) -> Result<bool> {
        let mut matched = false;
        for predicate in &self.predicates {
            if predicate.test(row)? {
                matched = true;
                break;
            }
        }
        Ok(matched != self.invert)
    }
}

impl<S: Source> Source for RowFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.source.columns()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let rows = self.source.iter()?;
        Ok(Box::new(rows.filter_map(move |row| {
            row.and_then(|row| Ok(self.accepts(&row)?.then_some(row)))
                .transpose()
        })))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
