//! Whitespace and case cleanup.

use once_cell::unsync::OnceCell;

use crate::column::{Column, Columns};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::pattern::{compile_strict, IntoPatterns, Pattern};
use crate::row::Row;
use crate::source::{RowIter, Source};

/// Rewrites the values of matching columns.
///
/// Built empty by [`Source::clean`] and configured with one call per
/// rule. Each rule's patterns are compiled strictly. For a column
/// matched by several rules, whitespace is cleaned first, then upper
/// case is applied, then lower case. Missing cells stay missing.
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["#adm1", "#adm1+code"],
///     vec!["  Coastal \t Region ", "cst01"],
/// ])
/// .unwrap();
/// let clean = data
///     .clean()
///     .whitespace("#adm1-code")
///     .unwrap()
///     .upper("#adm1+code")
///     .unwrap();
/// let row = &clean.rows().unwrap()[0];
/// assert_eq!(row.get("#adm1-code").unwrap(), Some("Coastal Region"));
/// assert_eq!(row.get("#adm1+code").unwrap(), Some("CST01"));
/// ```
#[derive(Debug)]
pub struct CleanFilter<S> {
    source: S,
    whitespace: Vec<Pattern>,
    upper: Vec<Pattern>,
    lower: Vec<Pattern>,
    plan: OnceCell<Vec<Cleanup>>,
}

/// What to do to one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cleanup {
    whitespace: bool,
    upper: bool,
    lower: bool,
}

impl Cleanup {
    fn is_noop(&self) -> bool {
        !(self.whitespace || self.upper || self.lower)
    }

    fn apply(&self, value: String) -> String {
        let mut value = if self.whitespace {
            value.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            value
        };
        if self.upper {
            value = value.to_uppercase();
        }
        if self.lower {
            value = value.to_lowercase();
        }
        value
    }
}

impl<S: Source> CleanFilter<S> {
    /// Wraps `source` with no rules; it passes rows through unchanged.
    pub fn new(source: S) -> Self {
        CleanFilter {
            source,
            whitespace: Vec::new(),
            upper: Vec::new(),
            lower: Vec::new(),
            plan: OnceCell::new(),
        }
    }

    /// Trims matching values and collapses internal whitespace runs.
    pub fn whitespace<P: IntoPatterns>(mut self, patterns: P) -> Result<Self> {
        self.whitespace.extend(compile_strict(patterns)?);
        Ok(self)
    }

    /// Upper-cases matching values.
    pub fn upper<P: IntoPatterns>(mut self, patterns: P) -> Result<Self> {
        self.upper.extend(compile_strict(patterns)?);
        Ok(self)
    }

    /// Lower-cases matching values.
    pub fn lower<P: IntoPatterns>(mut self, patterns: P) -> Result<Self> {
        self.lower.extend(compile_strict(patterns)?);
        Ok(self)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn plan(&self) -> Result<&Vec<Cleanup>> {
        self.plan.get_or_try_init(|| {
            Ok(self
                .source
                .columns()?
                .iter()
                .map(|column| Cleanup {
                    whitespace: any_match(&self.whitespace, column.as_ref()),
                    upper: any_match(&self.upper, column.as_ref()),
                    lower: any_match(&self.lower, column.as_ref()),
                })
                .collect())
        })
    }
}

fn any_match(patterns: &[Pattern], column: Option<&Column>) -> bool {
    patterns.iter().any(|pattern| pattern.matches_opt(column))
}

impl<S: Source> Source for CleanFilter<S> {
    fn columns(&self) -> Result<Columns> {
        self.source.columns()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let plan = self.plan()?;
        let rows = self.source.iter()?;
        if plan.iter().all(Cleanup::is_noop) {
            return Ok(rows);
        }
        Ok(Box::new(rows.map(move |row| {
            let row = row?;
            let columns = row.columns().clone();
            let values = row
                .into_values()
                .into_iter()
                .enumerate()
                .map(|(i, value)| match plan.get(i) {
                    Some(cleanup) => value.map(|v| cleanup.apply(v)),
                    None => value,
                })
                .collect();
            Ok(Row::new(values, columns))
        })))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
