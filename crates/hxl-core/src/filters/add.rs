//! Constant-value columns.

use once_cell::unsync::OnceCell;

use crate::column::{Column, Columns};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::row::Row;
use crate::source::{RowIter, Source};

/// Adds a column holding the same value in every row, after the
/// upstream columns or, with `before`, ahead of them.
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![vec!["#org"], vec!["MSF"], vec!["UNICEF"]]).unwrap();
/// let tagged = data.add_column("#country", Some("Country"), "Mali", true).unwrap();
/// assert_eq!(tagged.display_tags().unwrap()[0].as_deref(), Some("#country"));
/// assert_eq!(tagged.values("#country").unwrap(), vec!["Mali"]);
/// ```
#[derive(Debug)]
pub struct AddFilter<S> {
    source: S,
    column: Column,
    value: String,
    before: bool,
    columns: OnceCell<Columns>,
}

impl<S: Source> AddFilter<S> {
    /// Wraps `source`. A malformed `tagspec` is an error.
    pub fn new(
        source: S,
        tagspec: &str,
        header: Option<&str>,
        value: impl Into<String>,
        before: bool,
    ) -> Result<Self> {
        Ok(AddFilter {
            source,
            column: Column::parse(tagspec, header)?,
            value: value.into(),
            before,
            columns: OnceCell::new(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The added column.
    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn extended_columns(&self) -> Result<&Columns> {
        self.columns.get_or_try_init(|| {
            let upstream = self.source.columns()?;
            let mut columns = Vec::with_capacity(upstream.len() + 1);
            if self.before {
                columns.push(Some(self.column.clone()));
                columns.extend(upstream.iter().cloned());
            } else {
                columns.extend(upstream.iter().cloned());
                columns.push(Some(self.column.clone()));
            }
            Ok(columns.into())
        })
    }
}

impl<S: Source> Source for AddFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.extended_columns().cloned()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let columns = self.extended_columns()?;
        let rows = self.source.iter()?;
        Ok(Box::new(rows.map(move |row| {
            let mut values = row?.into_values();
            let value = Some(self.value.clone());
            if self.before {
                values.insert(0, value);
            } else {
                // ragged rows are padded so the value lands in its column
                values.resize(columns.len() - 1, None);
                values.push(value);
            }
            Ok(Row::new(values, columns.clone()))
        })))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
