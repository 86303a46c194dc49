//! The [`Source`] trait: anything with a column list and a row iterator.
//!
//! Implementors provide three methods ([`columns`](Source::columns),
//! [`iter`](Source::iter) and [`diagnostics`](Source::diagnostics)) and
//! get every derived query and every chain builder for free.
//!
//! Builders consume the source. To keep using it afterwards, build from
//! a reference with [`by_ref`](Source::by_ref), or wrap it in an `Rc`:
//!
//! ```
//! use hxl_core::{Dataset, Source};
//!
//! let data = Dataset::new(vec![
//!     vec!["#org", "#sector"],
//!     vec!["UNICEF", "WASH"],
//!     vec!["MSF", "Health"],
//! ])
//! .unwrap();
//!
//! let wash = data.by_ref().with_rows("#sector=wash").unwrap();
//! assert_eq!(wash.row_count().unwrap(), 1);
//! assert_eq!(data.row_count().unwrap(), 2);
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;

use crate::column::{Column, Columns};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::filters::{
    AddFilter, CacheFilter, CleanFilter, ColumnFilter, CountFilter, IndexFilter, RenameFilter,
    RowFilter, SortFilter,
};
use crate::pattern::{compile_lenient, AsPattern, IntoPatterns, Pattern};
use crate::predicate::IntoPredicates;
use crate::row::Row;
use crate::value::{is_number, parse_number};

/// Boxed row cursor returned by [`Source::iter`].
///
/// Items are `Result`s: a filter may fail part-way through (a regex
/// predicate against a missing cell, say) and the error surfaces here.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Share of non-empty values that must be numeric for
/// [`Source::is_numbery`].
const NUMBERY_THRESHOLD: f64 = 0.9;

/// A tagged tabular data source.
///
/// Generic methods carry `where Self: Sized` so that `dyn Source` stays
/// object safe; call them on `Box<dyn Source>` (which is itself a
/// `Source`) rather than on a bare trait object.
pub trait Source {
    /// The column list. `None` entries are untagged columns.
    fn columns(&self) -> Result<Columns>;

    /// A fresh cursor over the rows.
    fn iter(&self) -> Result<RowIter<'_>>;

    /// The diagnostics channel lenient parse failures are reported to.
    fn diagnostics(&self) -> &Diagnostics;

    // ========================================================================
    // Derived queries
    // ========================================================================

    /// Drains a fresh cursor into a vector.
    ///
    /// Prefer [`iter`](Source::iter) for large data.
    fn rows(&self) -> Result<Vec<Row>> {
        self.iter()?.collect()
    }

    /// Number of rows the cursor yields.
    fn row_count(&self) -> Result<usize> {
        let mut count = 0;
        for row in self.iter()? {
            row?;
            count += 1;
        }
        Ok(count)
    }

    /// Column headers, in column order.
    fn headers(&self) -> Result<Vec<Option<String>>> {
        Ok(project(&self.columns()?, |c| c.header().map(str::to_string)))
    }

    /// Bare tags (no attributes), in column order.
    fn tags(&self) -> Result<Vec<Option<String>>> {
        Ok(project(&self.columns()?, |c| Some(c.tag().to_string())))
    }

    /// Display tags (tag plus sorted attributes), in column order.
    fn display_tags(&self) -> Result<Vec<Option<String>>> {
        Ok(project(&self.columns()?, |c| Some(c.display_tag())))
    }

    /// Returns `true` if any column matches.
    fn has_column<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<bool>
    where
        Self: Sized,
    {
        Ok(!self.matching_columns(pattern)?.is_empty())
    }

    /// Every matching column, in column order.
    fn matching_columns<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Vec<Column>>
    where
        Self: Sized,
    {
        let Some(pattern) = compile_lenient(pattern, self.diagnostics()) else {
            return Ok(Vec::new());
        };
        Ok(self
            .columns()?
            .iter()
            .flatten()
            .filter(|column| pattern.matches(column))
            .cloned()
            .collect())
    }

    /// The smallest value of the first matching column across all rows.
    ///
    /// If any value parses as a number, non-numeric values are ignored
    /// and the comparison is numeric. A column with no numbers at all is
    /// compared as strings. Blank cells are ignored. The original cell
    /// text is returned.
    fn min<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Option<String>>
    where
        Self: Sized,
    {
        extremum(self, pattern, Ordering::Less)
    }

    /// The largest value of the first matching column across all rows.
    ///
    /// See [`min`](Source::min) for the comparison rules.
    fn max<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Option<String>>
    where
        Self: Sized,
    {
        extremum(self, pattern, Ordering::Greater)
    }

    /// Distinct values of the first matching column, in first-seen
    /// order. Missing cells are skipped.
    fn values<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<Vec<String>>
    where
        Self: Sized,
    {
        let Some(pattern) = compile_lenient(pattern, self.diagnostics()) else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for row in self.iter()? {
            let row = row?;
            if let Some(value) = row.get(&*pattern)? {
                if seen.insert(value.to_string()) {
                    values.push(value.to_string());
                }
            }
        }
        Ok(values)
    }

    /// Returns `true` if at least 90% of the non-empty values of the
    /// first matching column are numbers.
    ///
    /// A column with no non-empty values is not numbery.
    fn is_numbery<P: AsPattern + ?Sized>(&self, pattern: &P) -> Result<bool>
    where
        Self: Sized,
    {
        let Some(pattern) = compile_lenient(pattern, self.diagnostics()) else {
            return Ok(false);
        };
        let (mut seen, mut numeric) = (0usize, 0usize);
        for row in self.iter()? {
            let row = row?;
            match row.get(&*pattern)? {
                Some(value) if !value.trim().is_empty() => {
                    seen += 1;
                    if is_number(value) {
                        numeric += 1;
                    }
                }
                _ => {}
            }
        }
        Ok(seen > 0 && numeric as f64 / seen as f64 >= NUMBERY_THRESHOLD)
    }

    /// Calls `callback(row, source, index)` for every row and returns
    /// the number of rows processed.
    fn each<F>(&self, mut callback: F) -> Result<usize>
    where
        Self: Sized,
        F: FnMut(&Row, &Self, usize),
    {
        let mut index = 0;
        for row in self.iter()? {
            callback(&row?, self, index);
            index += 1;
        }
        Ok(index)
    }

    /// Alias for [`each`](Source::each).
    fn for_each<F>(&self, callback: F) -> Result<usize>
    where
        Self: Sized,
        F: FnMut(&Row, &Self, usize),
    {
        self.each(callback)
    }

    // ========================================================================
    // Chain builders
    // ========================================================================

    /// Borrows the source so a builder does not consume it.
    fn by_ref(&self) -> &Self
    where
        Self: Sized,
    {
        self
    }

    /// Keeps rows matching any of the predicates.
    fn with_rows<P: IntoPredicates>(self, predicates: P) -> Result<RowFilter<Self>>
    where
        Self: Sized,
    {
        RowFilter::new(self, predicates, false)
    }

    /// Keeps rows matching none of the predicates.
    fn without_rows<P: IntoPredicates>(self, predicates: P) -> Result<RowFilter<Self>>
    where
        Self: Sized,
    {
        RowFilter::new(self, predicates, true)
    }

    /// Keeps only columns matching at least one pattern.
    fn with_columns<P: IntoPatterns>(self, patterns: P) -> ColumnFilter<Self>
    where
        Self: Sized,
    {
        ColumnFilter::new(self, patterns, false)
    }

    /// Drops columns matching any pattern.
    fn without_columns<P: IntoPatterns>(self, patterns: P) -> ColumnFilter<Self>
    where
        Self: Sized,
    {
        ColumnFilter::new(self, patterns, true)
    }

    /// Counts distinct combinations of the matched columns' values,
    /// optionally summarising a numeric column per combination.
    fn count<P: IntoPatterns>(
        self,
        patterns: P,
        aggregate: Option<&str>,
    ) -> Result<CountFilter<Self>>
    where
        Self: Sized,
    {
        let aggregate = aggregate.map(Pattern::parse).transpose()?;
        CountFilter::new(self, patterns, aggregate)
    }

    /// Replaces the tag (and optionally the header) of matching columns.
    ///
    /// With `index`, only the Nth match (0-based) is renamed.
    fn rename<P: AsPattern + ?Sized>(
        self,
        pattern: &P,
        tagspec: &str,
        header: Option<&str>,
        index: Option<usize>,
    ) -> Result<RenameFilter<Self>>
    where
        Self: Sized,
    {
        RenameFilter::new(self, pattern, tagspec, header, index)
    }

    /// Materialises columns and rows on first use.
    fn cache(self) -> CacheFilter<Self>
    where
        Self: Sized,
    {
        CacheFilter::new(self)
    }

    /// Numbers matching columns `+i0`, `+i1`, ... from left to right.
    fn index<P: AsPattern + ?Sized>(self, pattern: &P) -> IndexFilter<Self>
    where
        Self: Sized,
    {
        IndexFilter::new(self, pattern)
    }

    /// Sorts rows by the columns matching `patterns` (every column when
    /// the list is empty).
    fn sort<P: IntoPatterns>(self, patterns: P, reverse: bool) -> Result<SortFilter<Self>>
    where
        Self: Sized,
    {
        SortFilter::new(self, patterns, reverse)
    }

    /// Adds a column with the same value in every row.
    fn add_column(
        self,
        tagspec: &str,
        header: Option<&str>,
        value: &str,
        before: bool,
    ) -> Result<AddFilter<Self>>
    where
        Self: Sized,
    {
        AddFilter::new(self, tagspec, header, value, before)
    }

    /// Starts a whitespace and case cleanup; see [`CleanFilter`].
    fn clean(self) -> CleanFilter<Self>
    where
        Self: Sized,
    {
        CleanFilter::new(self)
    }
}

fn project<F>(columns: &Columns, f: F) -> Vec<Option<String>>
where
    F: Fn(&Column) -> Option<String>,
{
    columns.iter().map(|c| c.as_ref().and_then(&f)).collect()
}

fn extremum<S, P>(source: &S, pattern: &P, wanted: Ordering) -> Result<Option<String>>
where
    S: Source,
    P: AsPattern + ?Sized,
{
    let Some(pattern) = compile_lenient(pattern, source.diagnostics()) else {
        return Ok(None);
    };
    // Numbers win as soon as one is seen; text only counts for columns
    // with no numbers at all.
    let mut best_number: Option<(f64, String)> = None;
    let mut best_text: Option<String> = None;
    for row in source.iter()? {
        let row = row?;
        let Some(value) = row.get(&*pattern)? else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }
        match parse_number(value) {
            Some(n) => {
                if best_number
                    .as_ref()
                    .map_or(true, |(current, _)| n.total_cmp(current) == wanted)
                {
                    best_number = Some((n, value.to_string()));
                }
            }
            None if best_number.is_none() => {
                if best_text
                    .as_deref()
                    .map_or(true, |current| value.cmp(current) == wanted)
                {
                    best_text = Some(value.to_string());
                }
            }
            None => {}
        }
    }
    Ok(best_number.map(|(_, text)| text).or(best_text))
}

impl<S: Source + ?Sized> Source for &S {
    fn columns(&self) -> Result<Columns> {
        (**self).columns()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        (**self).iter()
    }

    fn diagnostics(&self) -> &Diagnostics {
        (**self).diagnostics()
    }
}

impl<S: Source + ?Sized> Source for Rc<S> {
    fn columns(&self) -> Result<Columns> {
        (**self).columns()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        (**self).iter()
    }

    fn diagnostics(&self) -> &Diagnostics {
        (**self).diagnostics()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn columns(&self) -> Result<Columns> {
        (**self).columns()
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        (**self).iter()
    }

    fn diagnostics(&self) -> &Diagnostics {
        (**self).diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::Dataset;

    fn dataset(rows: &[&[&str]]) -> Dataset {
        Dataset::new(rows.iter().map(|r| r.to_vec())).unwrap()
    }

    fn sample() -> Dataset {
        dataset(&[
            &["Organisation", "Sector", "Affected"],
            &["#org", "#sector", "#affected"],
            &["UNICEF", "WASH", "100"],
            &["MSF", "Health", "25"],
            &["UNICEF", "Health", "9"],
            &["", "WASH", ""],
        ])
    }

    #[test]
    fn projections() {
        let data = sample();
        assert_eq!(
            data.headers().unwrap(),
            vec![
                Some("Organisation".to_string()),
                Some("Sector".to_string()),
                Some("Affected".to_string())
            ]
        );
        assert_eq!(
            data.tags().unwrap(),
            vec![
                Some("#org".to_string()),
                Some("#sector".to_string()),
                Some("#affected".to_string())
            ]
        );
    }

    #[test]
    fn projections_keep_untagged_positions() {
        let data = dataset(&[&["#org", "", "#adm1+code"], &["a", "b", "c"]]);
        assert_eq!(
            data.display_tags().unwrap(),
            vec![
                Some("#org".to_string()),
                None,
                Some("#adm1+code".to_string()),
            ]
        );
        assert_eq!(data.headers().unwrap(), vec![None, None, None]);
    }

    #[test]
    fn min_max_are_numeric_when_possible() {
        let data = sample();
        assert_eq!(data.min("#affected").unwrap().as_deref(), Some("9"));
        assert_eq!(data.max("#affected").unwrap().as_deref(), Some("100"));
        assert_eq!(data.min("#org").unwrap().as_deref(), Some("MSF"));
        assert_eq!(data.max("#adm1").unwrap(), None);
    }

    #[test]
    fn min_max_skip_text_in_numeric_columns() {
        let data = dataset(&[&["#n"], &["5"], &["n/a"], &["7"]]);
        assert_eq!(data.max("#n").unwrap().as_deref(), Some("7"));
        assert_eq!(data.min("#n").unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn min_max_ignore_row_order() {
        let forward = dataset(&[&["#n"], &["10"], &["9"], &["1a"]]);
        let shuffled = dataset(&[&["#n"], &["1a"], &["10"], &["9"]]);
        for data in [&forward, &shuffled] {
            assert_eq!(data.max("#n").unwrap().as_deref(), Some("10"));
            assert_eq!(data.min("#n").unwrap().as_deref(), Some("9"));
        }
    }

    #[test]
    fn values_are_distinct() {
        let data = sample();
        assert_eq!(data.values("#sector").unwrap(), vec!["WASH", "Health"]);
        assert_eq!(data.values("#org").unwrap(), vec!["UNICEF", "MSF", ""]);
    }

    #[test]
    fn has_column_and_matching_columns() {
        let data = dataset(&[&["#org+impl", "#org+funder", "#sector"], &["a", "b", "c"]]);
        assert!(data.has_column("#org").unwrap());
        assert!(!data.has_column("#adm1").unwrap());
        let matched = data.matching_columns("#org-impl").unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].display_tag(), "#org+funder");
    }

    #[test]
    fn bad_patterns_degrade_to_no_match() {
        let data = sample();
        let reports = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&reports);
        data.diagnostics()
            .add_logger(move |_| *sink.borrow_mut() += 1);

        assert!(!data.has_column("#bad tag!").unwrap());
        assert_eq!(data.min("#bad tag!").unwrap(), None);
        assert!(data.values("#bad tag!").unwrap().is_empty());
        assert!(!data.is_numbery("#bad tag!").unwrap());
        assert_eq!(*reports.borrow(), 4);
    }

    #[test]
    fn is_numbery_thresholds() {
        let numbery = dataset(&[&["#n"], &["1"], &["2"], &["3"], &[""]]);
        assert!(numbery.is_numbery("#n").unwrap());

        let mostly_text = dataset(&[&["#n"], &["1"], &["a"], &["b"]]);
        assert!(!mostly_text.is_numbery("#n").unwrap());

        let empty = dataset(&[&["#n"], &[""], &[" "]]);
        assert!(!empty.is_numbery("#n").unwrap());
    }

    #[test]
    fn each_passes_row_source_and_index() {
        let data = sample();
        let mut seen = Vec::new();
        let processed = data
            .each(|row, source, index| {
                assert_eq!(source.columns().unwrap().len(), 3);
                seen.push((index, row.get("#sector").unwrap().map(str::to_string)));
            })
            .unwrap();
        assert_eq!(processed, 4);
        assert_eq!(seen[0], (0, Some("WASH".to_string())));
        assert_eq!(seen[3].0, 3);
        assert_eq!(data.for_each(|_, _, _| {}).unwrap(), 4);
    }

    #[test]
    fn boxed_sources_compose() {
        let boxed: Box<dyn Source> = Box::new(sample());
        let filtered: Box<dyn Source> = Box::new(boxed.with_rows("#sector=health").unwrap());
        assert_eq!(filtered.row_count().unwrap(), 2);
        assert!(filtered.has_column("#org").unwrap());
    }

    #[test]
    fn shared_sources_feed_several_chains() {
        let shared = Rc::new(sample());
        let wash = Rc::clone(&shared).with_rows("#sector=wash").unwrap();
        let orgs = Rc::clone(&shared).with_columns("#org");
        assert_eq!(wash.row_count().unwrap(), 2);
        assert_eq!(orgs.columns().unwrap().len(), 1);
        assert!(shared.diagnostics().same(wash.diagnostics()));
    }
}
