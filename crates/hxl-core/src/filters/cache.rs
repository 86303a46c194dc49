//! Materialisation of an upstream chain.

use once_cell::unsync::OnceCell;

use crate::column::Columns;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::row::Row;
use crate::source::{RowIter, Source};

/// Reads the upstream columns and rows once and replays them on every
/// later request.
///
/// Put one after an expensive chain that several consumers read.
#[derive(Debug)]
pub struct CacheFilter<S> {
    source: S,
    columns: OnceCell<Columns>,
    rows: OnceCell<Vec<Row>>,
}

impl<S: Source> CacheFilter<S> {
    pub fn new(source: S) -> Self {
        CacheFilter {
            source,
            columns: OnceCell::new(),
            rows: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns `true` once the rows have been materialised.
    pub fn is_filled(&self) -> bool {
        self.rows.get().is_some()
    }

    fn cached_rows(&self) -> Result<&Vec<Row>> {
        self.rows.get_or_try_init(|| {
            let rows = self.source.rows()?;
            tracing::debug!(rows = rows.len(), "cached upstream rows");
            Ok(rows)
        })
    }
}

impl<S: Source> Source for CacheFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.columns
            .get_or_try_init(|| self.source.columns())
            .cloned()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        Ok(Box::new(self.cached_rows()?.iter().cloned().map(Ok)))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
