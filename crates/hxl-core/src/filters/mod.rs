//! Filters: sources that transform exactly one upstream source.
//!
//! | Filter | Built by | Columns | Rows |
//! |--------|----------|---------|------|
//! | [`RowFilter`] | `with_rows` / `without_rows` | unchanged | streamed, some skipped |
//! | [`ColumnFilter`] | `with_columns`, `without_columns` | projected, memoized | sliced |
//! | [`CountFilter`] | `count` | group-by plus counts, memoized | computed once |
//! | [`RenameFilter`] | `rename` | retagged, memoized | streamed, retagged |
//! | [`IndexFilter`] | `index` | `+iN` added, memoized | streamed, retagged |
//! | [`CacheFilter`] | `cache` | memoized | computed once |
//! | [`SortFilter`] | `sort` | unchanged | computed once, reordered |
//! | [`AddFilter`] | `add_column` | one added, memoized | streamed, extended |
//! | [`CleanFilter`] | `clean` | unchanged | streamed, values rewritten |
//!
//! Every filter shares its upstream's [`Diagnostics`](crate::Diagnostics).

mod add;
mod cache;
mod clean;
mod column;
mod count;
mod index;
mod rename;
mod row;
mod sort;

pub use add::AddFilter;
pub use cache::CacheFilter;
pub use clean::CleanFilter;
pub use column::ColumnFilter;
pub use count::CountFilter;
pub use index::IndexFilter;
pub use rename::RenameFilter;
pub use row::RowFilter;
pub use sort::SortFilter;
