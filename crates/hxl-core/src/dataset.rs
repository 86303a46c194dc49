//! A [`Source`] backed by a raw grid of strings.
//!
//! The grid is whatever a CSV (or spreadsheet) reader produced: rows of
//! cells, with free-form preamble rows, an optional header row, the
//! hashtag row and then the data.

use crate::column::{Column, Columns};
use crate::diagnostics::Diagnostics;
use crate::error::{HxlError, Result};
use crate::pattern::is_tag_shaped;
use crate::row::Row;
use crate::source::{RowIter, Source};

/// How many leading rows are searched for the hashtag row by default.
pub const DEFAULT_TAG_ROW_SCAN_LIMIT: usize = 25;

/// Tuning for [`Dataset`] construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetOptions {
    /// Maximum number of leading rows searched for the hashtag row.
    pub tag_row_scan_limit: usize,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        DatasetOptions {
            tag_row_scan_limit: DEFAULT_TAG_ROW_SCAN_LIMIT,
        }
    }
}

/// An HXL dataset built from a raw grid.
///
/// The hashtag row is located (and the columns built) when the dataset
/// is constructed, so a grid with no hashtag row fails up front.
///
/// # Example
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["Organisation", "Sector"],
///     vec!["#org", "#sector"],
///     vec!["UNICEF", "WASH"],
/// ])
/// .unwrap();
///
/// assert_eq!(data.tag_row(), 1);
/// assert_eq!(data.headers().unwrap()[0].as_deref(), Some("Organisation"));
/// let row = data.iter().unwrap().next().unwrap().unwrap();
/// assert_eq!(row.get("#sector").unwrap(), Some("WASH"));
/// ```
#[derive(Debug)]
pub struct Dataset {
    grid: Vec<Vec<String>>,
    tag_row: usize,
    columns: Columns,
    diagnostics: Diagnostics,
}

impl Dataset {
    /// Builds a dataset with default options and a fresh diagnostics
    /// channel.
    pub fn new<R, C>(grid: impl IntoIterator<Item = R>) -> Result<Dataset>
    where
        R: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Dataset::with_options(grid, DatasetOptions::default(), Diagnostics::new())
    }

    /// Builds a dataset with explicit options, reporting malformed
    /// hashtags to `diagnostics`.
    pub fn with_options<R, C>(
        grid: impl IntoIterator<Item = R>,
        options: DatasetOptions,
        diagnostics: Diagnostics,
    ) -> Result<Dataset>
    where
        R: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let grid: Vec<Vec<String>> = grid
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let scanned = grid.len().min(options.tag_row_scan_limit);
        let tag_row = grid[..scanned]
            .iter()
            .position(|row| is_tag_row(row))
            .ok_or(HxlError::NoTagRow { scanned })?;

        let headers = tag_row.checked_sub(1).map(|i| &grid[i]);
        let columns: Columns = grid[tag_row]
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if !cell.trim_start().starts_with('#') {
                    return None;
                }
                let header = headers.and_then(|row| row.get(i)).map(String::as_str);
                Column::parse_lenient(cell, header, &diagnostics)
            })
            .collect::<Vec<_>>()
            .into();

        tracing::debug!(
            tag_row,
            columns = columns.len(),
            rows = grid.len() - tag_row - 1,
            "found HXL hashtag row"
        );

        Ok(Dataset {
            grid,
            tag_row,
            columns,
            diagnostics,
        })
    }

    /// Zero-based position of the hashtag row in the grid.
    pub fn tag_row(&self) -> usize {
        self.tag_row
    }

    /// The raw grid, preamble included.
    pub fn grid(&self) -> &[Vec<String>] {
        &self.grid
    }
}

/// A hashtag row has at least one hashtag and nothing else but blanks.
fn is_tag_row(row: &[String]) -> bool {
    let mut seen_tag = false;
    for cell in row.iter().filter(|cell| !cell.trim().is_empty()) {
        if !is_tag_shaped(cell) {
            return false;
        }
        seen_tag = true;
    }
    seen_tag
}

impl Source for Dataset {
    fn columns(&self) -> Result<Columns> {
        Ok(self.columns.clone())
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let columns = self.columns.clone();
        Ok(Box::new(self.grid[self.tag_row + 1..].iter().map(move |cells| {
            Ok(Row::new(
                cells.iter().cloned().map(Some).collect(),
                columns.clone(),
            ))
        })))
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
