//! Counting and numeric aggregation.

use std::collections::HashMap;

use once_cell::unsync::OnceCell;

use crate::column::{Column, Columns};
use crate::diagnostics::Diagnostics;
use crate::error::{HxlError, Result};
use crate::pattern::{compile_strict, IntoPatterns, Pattern};
use crate::row::Row;
use crate::source::{RowIter, Source};
use crate::value::{format_number, parse_number};

/// Counts the distinct combinations of values in the matched columns.
///
/// Output columns are the source columns matching any group-by pattern
/// (source order, each once), then `#meta+count`, then, when an
/// aggregate pattern is given, `<tag>+sum`, `+avg`, `+min` and `+max`
/// for the aggregate's tag.
///
/// The whole upstream is scanned on first access and the result is
/// kept. Output rows come out in the order their key was first seen.
///
/// Aggregates only see values that parse as finite numbers; a key with
/// no numeric values gets four empty cells.
///
/// # Example
///
/// ```
/// use hxl_core::{Dataset, Source};
///
/// let data = Dataset::new(vec![
///     vec!["#adm1", "#affected"],
///     vec!["Coast", "100"],
///     vec!["Coast", "50"],
///     vec!["Hills", "n/a"],
/// ])
/// .unwrap();
///
/// let counted = data.count("#adm1", Some("#affected")).unwrap();
/// assert_eq!(
///     counted.display_tags().unwrap(),
///     [
///         "#adm1",
///         "#meta+count",
///         "#affected+sum",
///         "#affected+avg",
///         "#affected+min",
///         "#affected+max",
///     ]
///     .map(|t| Some(t.to_string()))
/// );
/// let coast = &counted.rows().unwrap()[0];
/// assert_eq!(coast.get("#meta+count").unwrap(), Some("2"));
/// assert_eq!(coast.get("#affected+avg").unwrap(), Some("75"));
/// ```
#[derive(Debug)]
pub struct CountFilter<S> {
    source: S,
    patterns: Vec<Pattern>,
    aggregate: Option<Pattern>,
    counted: OnceCell<Counted>,
}

#[derive(Debug)]
struct Counted {
    columns: Columns,
    rows: Vec<Row>,
}

/// Running numeric summary for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Aggregate {
    count: u64,
    sum: f64,
    avg: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Aggregate {
    fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.avg = (self.avg * (self.count - 1) as f64 + value) / self.count as f64;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Sum, average, minimum and maximum cells.
    fn cells(&self) -> [String; 4] {
        match (self.min, self.max) {
            (Some(min), Some(max)) => [
                format_number(self.sum),
                format_number(self.avg),
                format_number(min),
                format_number(max),
            ],
            _ => Default::default(),
        }
    }
}

#[derive(Debug)]
struct Group {
    key: Vec<String>,
    count: usize,
    aggregate: Aggregate,
}

impl<S: Source> CountFilter<S> {
    /// Wraps `source`. Group-by patterns are compiled strictly and at
    /// least one is required.
    pub fn new<P: IntoPatterns>(
        source: S,
        patterns: P,
        aggregate: Option<Pattern>,
    ) -> Result<Self> {
        let patterns = compile_strict(patterns)?;
        if patterns.is_empty() {
            return Err(HxlError::NoCountPatterns);
        }
        Ok(CountFilter {
            source,
            patterns,
            aggregate,
            counted: OnceCell::new(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn aggregate(&self) -> Option<&Pattern> {
        self.aggregate.as_ref()
    }

    fn counted(&self) -> Result<&Counted> {
        self.counted.get_or_try_init(|| self.count_upstream())
    }

    fn count_upstream(&self) -> Result<Counted> {
        let upstream = self.source.columns()?;
        let mut columns = Vec::new();
        let mut indices = Vec::new();
        for (i, column) in upstream.iter().enumerate() {
            if self.patterns.iter().any(|p| p.matches_opt(column.as_ref())) {
                columns.push(column.clone());
                indices.push(i);
            }
        }
        columns.push(Some(Column::new("#meta", ["count"], None)));
        if let Some(aggregate) = &self.aggregate {
            for attribute in ["sum", "avg", "min", "max"] {
                columns.push(Some(Column::new(aggregate.tag(), [attribute], None)));
            }
        }
        let columns: Columns = columns.into();

        let mut groups: Vec<Group> = Vec::new();
        let mut positions: HashMap<Vec<String>, usize> = HashMap::new();
        let mut scanned = 0usize;
        for row in self.source.iter()? {
            let row = row?;
            scanned += 1;
            let key: Vec<String> = indices
                .iter()
                .map(|&i| row.value(i).unwrap_or_default().to_string())
                .collect();
            let position = match positions.get(&key) {
                Some(&position) => position,
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push(Group {
                        key,
                        count: 0,
                        aggregate: Aggregate::default(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[position];
            group.count += 1;
            if let Some(aggregate) = &self.aggregate {
                if let Some(value) = row.get(aggregate)?.and_then(parse_number) {
                    group.aggregate.add_number(value);
                }
            }
        }
        tracing::debug!(scanned, groups = groups.len(), "counted rows");

        let rows = groups
            .into_iter()
            .map(|group| {
                let mut values: Vec<Option<String>> = group.key.into_iter().map(Some).collect();
                values.push(Some(group.count.to_string()));
                if self.aggregate.is_some() {
                    values.extend(group.aggregate.cells().map(Some));
                }
                Row::new(values, columns.clone())
            })
            .collect();

        Ok(Counted { columns, rows })
    }
}

impl<S: Source> Source for CountFilter<S> {
    fn columns(&self) -> Result<Columns> {
        Ok(self.counted()?.columns.clone())
    }

    fn iter(&self) -> Result<RowIter<'_>> {
        let counted = self.counted()?;
        Ok(Box::new(counted.rows.iter().cloned().map(Ok)))
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.source.diagnostics()
    }
}
