//! hxl-core - Tagged tabular datasets with composable filters.
//!
//! An HXL dataset is a grid of strings in which one row holds a hashtag
//! per column (`#org`, `#adm1+code`, ...). Hashtags give columns a
//! meaning independent of their headers, so data can be selected by
//! *what it is* rather than by where it sits:
//!
//! - [`Pattern`]: match columns by tag and required/forbidden attributes
//! - [`Dataset`]: locate the hashtag row of a raw grid and build columns
//! - [`Source`]: the shared interface, with derived queries (min, max,
//!   distinct values, "is this column numeric?") and chain builders
//! - Filters: select rows, project columns, count and aggregate,
//!   rename, index repeated tags, sort, add constant columns, clean
//!   values, cache
//!
//! # Quick Start
//!
//! ```rust
//! use hxl_core::{Dataset, Source};
//!
//! let data = Dataset::new(vec![
//!     vec!["Organisation", "Sector", "Region", "People affected"],
//!     vec!["#org", "#sector", "#adm1", "#affected"],
//!     vec!["UNICEF", "WASH", "Coast", "1200"],
//!     vec!["MSF", "Health", "Coast", "300"],
//!     vec!["UNICEF", "Health", "Hills", "450"],
//! ])
//! .unwrap();
//!
//! let report = data
//!     .by_ref()
//!     .without_rows("#sector=wash")
//!     .unwrap()
//!     .count("#adm1", Some("#affected"))
//!     .unwrap();
//!
//! let rows = report.rows().unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].get("#adm1").unwrap(), Some("Coast"));
//! assert_eq!(rows[0].get("#affected+sum").unwrap(), Some("300"));
//! assert!(data.is_numbery("#affected").unwrap());
//! ```
//!
//! # Evaluation
//!
//! Chains are pull-based: nothing runs until a row cursor is advanced.
//! [`CountFilter`], [`SortFilter`] and [`CacheFilter`] read their whole
//! upstream on first access and keep the result; column-rewriting
//! filters compute their column list once. None of these results are ever invalidated.
//!
//! # Malformed patterns
//!
//! | Where | On a bad pattern |
//! |-------|------------------|
//! | `Pattern::parse`, `Row::get`, predicates | `Err(HxlError)` |
//! | patterns in `count`, `sort` and `clean` | `Err(HxlError)` |
//! | tagspecs in `rename` and `add_column` | `Err(HxlError)` |
//! | derived queries, `with_columns`, `rename`, `index` | reported, matches nothing |
//!
//! Every lenient failure is emitted as a `tracing` warning and then
//! passed to the loggers registered on the source's [`Diagnostics`].

mod column;
mod dataset;
mod diagnostics;
mod error;
pub mod filters;
mod op;
mod pattern;
mod predicate;
mod row;
mod source;
mod value;

// Re-export public API
pub use column::{Column, Columns};
pub use dataset::{Dataset, DatasetOptions, DEFAULT_TAG_ROW_SCAN_LIMIT};
pub use diagnostics::{Diagnostics, Logger, Strictness};
pub use error::{HxlError, Result};
pub use filters::{
    AddFilter, CacheFilter, CleanFilter, ColumnFilter, CountFilter, IndexFilter, RenameFilter,
    RowFilter, SortFilter,
};
pub use op::Op;
pub use pattern::{AsPattern, IntoPatterns, Pattern, PatternSpec};
pub use predicate::{Condition, IntoPredicates, Predicate, RowTest, ValueCheck, ValueTest};
pub use row::Row;
pub use source::{RowIter, Source};
pub use value::{compare_values, format_number, is_number, norm, parse_number};
