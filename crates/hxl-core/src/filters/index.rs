//! Positional `+iN` attributes for repeated tags.

use once_cell::unsync::OnceCell;

use crate::column::Columns;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::pattern::{compile_lenient, AsPattern, Pattern};
use crate::source::{RowIter, Source};

/// Adds `+i0`, `+i1`, ... to the columns matching a pattern, numbering
/// matches from left to right.
///
/// Useful when repeated tags carry no distinguishing attributes. Other
/// columns pass through as the same handles; rows are re-tagged with
/// the indexed columns.
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![vec!["#org", "#org"], vec!["MSF", "ECHO"]]).unwrap();
/// let indexed = data.index("#org");
/// let row = &indexed.rows().unwrap()[0];
/// assert_eq!(row.get("#org+i1").unwrap(), Some("ECHO"));
/// ```
#[derive(Debug)]
pub struct IndexFilter<S> {
    source: S,
    pattern: Option<Pattern>,
    columns: OnceCell<Columns>,
}

impl<S: Source> IndexFilter<S> {
    /// Wraps `source`. A malformed pattern is reported and indexes
    /// nothing.
    pub fn new<P: AsPattern + ?Sized>(source: S, pattern: &P) -> Self {
        let pattern = compile_lenient(pattern, source.diagnostics())
            .map(|p| p.into_owned());
        IndexFilter {
            source,
            pattern,
            columns: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn indexed_columns(&self) -> Result<&Columns> {
        self.columns.get_or_try_init(|| {
            let upstream = self.source.columns()?;
            let Some(pattern) = &self.pattern else {
                return Ok(upstream);
            };
            let mut next = 0usize;
            Ok(upstream
                .iter()
                .map(|column| match column {
                    Some(column) if pattern.matches(column) => {
                        let indexed = column.with_attribute(format!("i{next}"));
                        next += 1;
                        Some(indexed)
                    }
                    other => other.clone(),
                })
                .collect::<Vec<_>>()
                .into())
        })
    }
}

impl<S: Source> Source for IndexFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.indexed_columns().cloned()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let columns = self.indexed_columns()?;
        let rows = self.source.iter()?;
        Ok(Box::new(rows.map(move |row| Ok(row?.retag(columns.clone())))))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
