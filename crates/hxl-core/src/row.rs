//! A single data record and pattern-based lookup within it.

use crate::column::{Column, Columns};
use crate::error::Result;
use crate::pattern::AsPattern;

/// One row of data: cell values paired, position by position, with the
/// column list of the source that produced them.
///
/// Lookups stop at the shorter of the two lists, so ragged rows are
/// safe to query.
///
/// ```
/// use std::rc::Rc;
/// use hxl_core::{Column, Columns, Row};
///
/// let columns: Columns = Rc::from(vec![
///     Some(Column::parse("#org", None).unwrap()),
///     Some(Column::parse("#sector", None).unwrap()),
/// ]);
/// let row = Row::new(vec![Some("UNICEF".into()), Some("WASH".into())], columns);
/// assert_eq!(row.get("#sector").unwrap(), Some("WASH"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Option<String>>,
    columns: Columns,
}

impl Row {
    pub fn new(values: Vec<Option<String>>, columns: Columns) -> Self {
        Row { values, columns }
    }

    /// Builds a row from plain strings (every cell present).
    pub fn from_strings<I, S>(values: I, columns: Columns) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Row::new(
            values.into_iter().map(|v| Some(v.into())).collect(),
            columns,
        )
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// The value at a position, if present.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Consumes the row, returning its values.
    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }

    /// Same values, different column list.
    pub fn retag(self, columns: Columns) -> Row {
        Row {
            values: self.values,
            columns,
        }
    }

    /// Positions, values and columns up to the shorter list's length.
    fn cells(&self) -> impl Iterator<Item = (usize, Option<&str>, Option<&Column>)> {
        self.values
            .iter()
            .zip(self.columns.iter())
            .enumerate()
            .map(|(index, (value, column))| (index, value.as_deref(), column.as_ref()))
    }

    /// Returns the first value whose column matches the pattern.
    ///
    /// A string pattern is compiled on every call; precompile with
    /// [`Pattern::parse`](crate::Pattern::parse) in hot loops. Fails only
    /// if a string pattern is malformed.
    pub fn get<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Option<&str>> {
        let pattern = pattern.as_pattern()?;
        Ok(self
            .cells()
            .find(|(_, _, column)| pattern.matches_opt(*column))
            .and_then(|(_, value, _)| value))
    }

    /// Returns every value whose column matches, in column order.
    ///
    /// Missing cells in matching columns are `None` entries.
    pub fn get_all<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Vec<Option<&str>>> {
        let pattern = pattern.as_pattern()?;
        Ok(self
            .cells()
            .filter(|(_, _, column)| pattern.matches_opt(*column))
            .map(|(_, value, _)| value)
            .collect())
    }

    /// Positions of the columns matching the pattern.
    pub fn positions<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Vec<usize>> {
        let pattern = pattern.as_pattern()?;
        Ok(self
            .cells()
            .filter(|(_, _, column)| pattern.matches_opt(*column))
            .map(|(index, _, _)| index)
            .collect())
    }
}
