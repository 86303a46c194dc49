//! Single filter steps.
//!
//! A [`FilterStep`] is the data form of one filter in a chain. Steps hold
//! plain strings so they serialize cleanly; patterns and predicates are
//! compiled when the step is validated or applied.

use hxl_core::{Column, Pattern, Predicate, Source};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A dynamically assembled pipeline stage.
pub type BoxedSource<'a> = Box<dyn Source + 'a>;

/// One filter in a recipe.
///
/// Serialized with a `filter` discriminator:
///
/// ```json
/// { "filter": "count", "tags": ["#adm1"], "aggregate": "#affected" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "lowercase")]
pub enum FilterStep {
    /// Keep rows matching any query, or drop them when `reverse` is set.
    Select {
        #[serde(default)]
        queries: Vec<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        reverse: bool,
    },

    /// Whitelist then blacklist columns. Either list may be empty.
    Cut {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        include: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        exclude: Vec<String>,
    },

    /// Count value combinations, optionally aggregating a numeric column.
    Count {
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aggregate: Option<String>,
    },

    /// Retag (and optionally re-head) matching columns.
    Rename {
        pattern: String,
        tagspec: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Number repeated columns with `+iN` attributes.
    Index { pattern: String },

    /// Order rows by the matching columns (every column when empty).
    Sort {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        reverse: bool,
    },

    /// Add a column with a constant value.
    Add {
        tagspec: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<String>,
        #[serde(default)]
        value: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        before: bool,
    },

    /// Normalise whitespace or case in matching columns.
    Clean {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        whitespace: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        upper: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        lower: Vec<String>,
    },

    /// Materialise everything upstream.
    Cache,
}

impl FilterStep {
    /// The step's name as used in the `filter` field.
    pub fn name(&self) -> &'static str {
        match self {
            FilterStep::Select { .. } => "select",
            FilterStep::Cut { .. } => "cut",
            FilterStep::Count { .. } => "count",
            FilterStep::Rename { .. } => "rename",
            FilterStep::Index { .. } => "index",
            FilterStep::Sort { .. } => "sort",
            FilterStep::Add { .. } => "add",
            FilterStep::Clean { .. } => "clean",
            FilterStep::Cache => "cache",
        }
    }

    /// Compiles every pattern, predicate and tagspec strictly.
    ///
    /// Applying a step is lenient where the core filters are lenient
    /// (column projections, rename and index patterns); validating first
    /// turns those silent no-ops into errors.
    pub fn validate(&self) -> Result<()> {
        match self {
            FilterStep::Select { queries, .. } => {
                for query in queries {
                    Predicate::parse(query)?;
                }
            }
            FilterStep::Cut { include, exclude } => {
                for pattern in include.iter().chain(exclude) {
                    Pattern::parse(pattern)?;
                }
            }
            FilterStep::Count { tags, aggregate } => {
                if tags.is_empty() {
                    return Err(hxl_core::HxlError::NoCountPatterns.into());
                }
                for pattern in tags.iter().chain(aggregate) {
                    Pattern::parse(pattern)?;
                }
            }
            FilterStep::Rename {
                pattern, tagspec, ..
            } => {
                Pattern::parse(pattern)?;
                Column::parse(tagspec, None)?;
            }
            FilterStep::Index { pattern } => {
                Pattern::parse(pattern)?;
            }
            FilterStep::Sort { tags, .. } => {
                for pattern in tags {
                    Pattern::parse(pattern)?;
                }
            }
            FilterStep::Add { tagspec, .. } => {
                Column::parse(tagspec, None)?;
            }
            FilterStep::Clean {
                whitespace,
                upper,
                lower,
            } => {
                for pattern in whitespace.iter().chain(upper).chain(lower) {
                    Pattern::parse(pattern)?;
                }
            }
            FilterStep::Cache => {}
        }
        Ok(())
    }

    /// Wraps `source` in the filter this step describes.
    pub fn apply<'a>(&self, source: BoxedSource<'a>) -> Result<BoxedSource<'a>> {
        let next: BoxedSource<'a> = match self {
            FilterStep::Select { queries, reverse } => {
                if *reverse {
                    Box::new(source.without_rows(queries.clone())?)
                } else {
                    Box::new(source.with_rows(queries.clone())?)
                }
            }
            FilterStep::Cut { include, exclude } => {
                let mut source = source;
                if !include.is_empty() {
                    source = Box::new(source.with_columns(include.clone()));
                }
                if !exclude.is_empty() {
                    source = Box::new(source.without_columns(exclude.clone()));
                }
                source
            }
            FilterStep::Count { tags, aggregate } => {
                Box::new(source.count(tags.clone(), aggregate.as_deref())?)
            }
            FilterStep::Rename {
                pattern,
                tagspec,
                header,
                index,
            } => Box::new(source.rename(
                pattern.as_str(),
                tagspec,
                header.as_deref(),
                *index,
            )?),
            FilterStep::Index { pattern } => Box::new(source.index(pattern.as_str())),
            FilterStep::Sort { tags, reverse } => Box::new(source.sort(tags.clone(), *reverse)?),
            FilterStep::Add {
                tagspec,
                header,
                value,
                before,
            } => Box::new(source.add_column(
                tagspec,
                header.as_deref(),
                value,
                *before,
            )?),
            FilterStep::Clean {
                whitespace,
                upper,
                lower,
            } => Box::new(
                source
                    .clean()
                    .whitespace(whitespace.clone())?
                    .upper(upper.clone())?
                    .lower(lower.clone())?,
            ),
            FilterStep::Cache => Box::new(source.cache()),
        };
        Ok(next)
    }
}

/// Splits a comma-separated tag list, dropping empty entries.
pub(crate) fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Adds the leading `#` to a tagspec when it is missing.
pub(crate) fn with_hash(tagspec: &str) -> String {
    let tagspec = tagspec.trim();
    if tagspec.starts_with('#') {
        tagspec.to_string()
    } else {
        format!("#{tagspec}")
    }
}
