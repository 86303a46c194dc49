//! Column renaming.

use once_cell::unsync::OnceCell;

use crate::column::{Column, Columns};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::pattern::{compile_lenient, AsPattern, Pattern};
use crate::source::{RowIter, Source};

/// Gives matching columns a new tagspec and, optionally, a new header.
///
/// With an `index`, only the Nth matching column (0-based, counting
/// matches only) is renamed. Without a new header the matched column
/// keeps its own. Columns that are not renamed pass through as the same
/// handles; row values are untouched.
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["Agency", "Partner"],
///     vec!["#org", "#org"],
///     vec!["ECHO", "MSF"],
/// ])
/// .unwrap();
///
/// let renamed = data.rename("#org", "#org+funder", Some("Donor"), Some(0)).unwrap();
/// assert_eq!(
///     renamed.display_tags().unwrap(),
///     vec![Some("#org+funder".to_string()), Some("#org".to_string())]
/// );
/// assert_eq!(renamed.headers().unwrap()[0].as_deref(), Some("Donor"));
/// ```
#[derive(Debug)]
pub struct RenameFilter<S> {
    source: S,
    pattern: Option<Pattern>,
    replacement: Column,
    header: Option<String>,
    index: Option<usize>,
    columns: OnceCell<Columns>,
}

impl<S: Source> RenameFilter<S> {
    /// Wraps `source`.
    ///
    /// A malformed `pattern` is reported and renames nothing; a malformed
    /// `tagspec` is an error.
    pub fn new<P: AsPattern + ?Sized>(
        source: S,
        pattern: &P,
        tagspec: &str,
        header: Option<&str>,
        index: Option<usize>,
    ) -> Result<Self> {
        let replacement = Column::parse(tagspec, None)?;
        let pattern = compile_lenient(pattern, source.diagnostics())
            .map(|p| p.into_owned());
        Ok(RenameFilter {
            source,
            pattern,
            replacement,
            header: header.map(str::to_string),
            index,
            columns: OnceCell::new(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn renamed_columns(&self) -> Result<&Columns> {
        self.columns.get_or_try_init(|| {
            let upstream = self.source.columns()?;
            let Some(pattern) = &self.pattern else {
                return Ok(upstream);
            };
            let mut seen = 0usize;
            let columns: Columns = upstream
                .iter()
                .map(|column| match column {
                    Some(column) if pattern.matches(column) => {
                        let nth = seen;
                        seen += 1;
                        if self.index.map_or(true, |index| index == nth) {
                            let header = match &self.header {
                                Some(header) => Some(header.clone()),
                                None => column.header().map(str::to_string),
                            };
                            Some(self.replacement.with_header(header))
                        } else {
                            Some(column.clone())
                        }
                    }
                    other => other.clone(),
                })
                .collect::<Vec<_>>()
                .into();
            tracing::debug!(
                pattern = %pattern,
                tagspec = %self.replacement,
                matched = seen,
                "renamed columns"
            );
            Ok(columns)
        })
    }
}

impl<S: Source> Source for RenameFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.renamed_columns().cloned()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let columns = self.renamed_columns()?;
        let rows = self.source.iter()?;
        Ok(Box::new(rows.map(move |row| Ok(row?.retag(columns.clone())))))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
