//! Column projection.

use once_cell::unsync::OnceCell;

use crate::column::Columns;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::pattern::{compile_lenient_all, IntoPatterns, Pattern};
use crate::row::Row;
use crate::source::{RowIter, Source};

/// Keeps the columns matching any pattern (whitelist) or drops them
/// (blacklist), in their original order.
///
/// Patterns are compiled leniently: a malformed one is reported to the
/// upstream diagnostics and matches nothing. Untagged columns never
/// match, so a blacklist keeps them.
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["#org", "#sector", "#contact+email"],
///     vec!["UNICEF", "WASH", "x@example.org"],
/// ])
/// .unwrap();
/// let public = data.without_columns("#contact");
/// assert_eq!(public.columns().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct ColumnFilter<S> {
    source: S,
    patterns: Vec<Pattern>,
    invert: bool,
    projection: OnceCell<Projection>,
}

#[derive(Debug)]
struct Projection {
    columns: Columns,
    indices: Vec<usize>,
}

impl<S: Source> ColumnFilter<S> {
    pub fn new<P: IntoPatterns>(source: S, patterns: P, invert: bool) -> Self {
        let patterns = compile_lenient_all(patterns, source.diagnostics());
        ColumnFilter {
            source,
            patterns,
            invert,
            projection: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Upstream positions of the kept columns.
    pub fn indices(&self) -> Result<&[usize]> {
        Ok(&self.projection()?.indices)
    }

    fn projection(&self) -> Result<&Projection> {
        self.projection.get_or_try_init(|| {
            let upstream = self.source.columns()?;
            let (indices, columns): (Vec<usize>, Vec<_>) = upstream
                .iter()
                .enumerate()
                .filter(|&(_, column)| {
                    let matched = self
                        .patterns
                        .iter()
                        .any(|pattern| pattern.matches_opt(column.as_ref()));
                    matched != self.invert
                })
                .map(|(i, column)| (i, column.clone()))
                .unzip();
            tracing::debug!(
                kept = indices.len(),
                upstream = upstream.len(),
                "projected columns"
            );
            Ok(Projection {
                columns: columns.into(),
                indices,
            })
        })
    }
}

impl<S: Source> Source for ColumnFilter<S> {
    fn columns(&self) -> Result<Columns> {
        Ok(self.projection()?.columns.clone())
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let projection = self.projection()?;
        let rows = self.source.iter()?;
        Ok(Box::new(rows.map(move |row| {
            let row = row?;
            let values = projection
                .indices
                .iter()
                .map(|&i| row.values().get(i).cloned().flatten())
                .collect();
            Ok(Row::new(values, projection.columns.clone()))
        })))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
