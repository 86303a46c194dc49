//! Ordered filter recipes.
//!
//! A [`Recipe`] can be written by hand, loaded from JSON or YAML, or read
//! from the numbered key/value parameters a filter form submits:
//!
//! ```text
//! filter01=select      select-query01-01=#sector=health
//! filter02=count       count-tags02=#org,#adm1   count-aggregate-tag02=#affected
//! filter03=rename      rename-oldtag03=#org      rename-newtag03=org+impl
//! ```

use std::collections::HashMap;

use hxl_core::Source;
use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};
use crate::step::{split_tags, with_hash, BoxedSource, FilterStep};

/// Number of step slots read when `filter_count` is not given.
pub const DEFAULT_FILTER_COUNT: usize = 5;

/// Upper bound on the number of step slots read.
pub const MAX_FILTER_COUNT: usize = 10;

/// Number of `select-queryNN-MM` sub-slots per select step.
pub const MAX_SELECT_QUERIES: usize = 5;

/// An ordered list of filter steps.
///
/// # Example
///
/// ```
/// use hxl_core::{Dataset, Source};
/// use hxl_recipe::Recipe;
///
/// let recipe = Recipe::from_args([
///     ("filter01", "select"),
///     ("select-query01-01", "#sector=health"),
///     ("filter02", "count"),
///     ("count-tags02", "#org"),
/// ])
/// .unwrap();
///
/// let data = Dataset::new(vec![
///     vec!["#org", "#sector"],
///     vec!["MSF", "Health"],
///     vec!["UNICEF", "WASH"],
///     vec!["MSF", "Health"],
/// ])
/// .unwrap();
///
/// let report = recipe.apply(&data).unwrap();
/// let rows = report.rows().unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].get("#meta+count").unwrap(), Some("2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    steps: Vec<FilterStep>,
}

impl Recipe {
    /// Creates an empty recipe, which applies as a pass-through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn step(mut self, step: FilterStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reads a recipe from numbered form parameters.
    ///
    /// Slots `filter01` up to `filter_count` (default
    /// [`DEFAULT_FILTER_COUNT`], at most [`MAX_FILTER_COUNT`]) are read in
    /// order. Empty or missing slots are skipped; an unrecognised filter
    /// name is an error. Parameters of other steps are ignored.
    pub fn from_args<I, K, V>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = Params::new(args);
        let filter_count = match params.get("filter_count") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| RecipeError::invalid("filter_count", value))?,
            None => DEFAULT_FILTER_COUNT,
        }
        .min(MAX_FILTER_COUNT);

        let mut steps = Vec::new();
        for n in 1..=filter_count {
            let Some(name) = params.numbered("filter", n) else {
                continue;
            };
            let step = params.step(name, n)?;
            tracing::debug!(slot = n, filter = step.name(), "read recipe step");
            steps.push(step);
        }
        Ok(Recipe { steps })
    }

    /// Compiles every step strictly, stopping at the first failure.
    pub fn validate(&self) -> Result<()> {
        self.steps.iter().try_for_each(FilterStep::validate)
    }

    /// Builds the filter chain on top of `source`, one filter per step.
    ///
    /// The source may be borrowed (`&dataset`) or owned.
    pub fn apply<'a, S: Source + 'a>(&self, source: S) -> Result<BoxedSource<'a>> {
        let mut chain: BoxedSource<'a> = Box::new(source);
        for (position, step) in self.steps.iter().enumerate() {
            chain = step.apply(chain)?;
            tracing::debug!(position, filter = step.name(), "applied recipe step");
        }
        Ok(chain)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }
}

impl FromIterator<FilterStep> for Recipe {
    fn from_iter<T: IntoIterator<Item = FilterStep>>(iter: T) -> Self {
        Recipe {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Form parameters with blank values removed.
struct Params(HashMap<String, String>);

impl Params {
    fn new<I, K, V>(args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Params(
            args.into_iter()
                .filter_map(|(key, value)| {
                    let value = value.as_ref().trim();
                    (!value.is_empty()).then(|| (key.as_ref().to_string(), value.to_string()))
                })
                .collect(),
        )
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn numbered(&self, name: &str, n: usize) -> Option<&str> {
        self.get(&format!("{name}{n:02}"))
    }

    /// A comma-separated tag list; missing means empty.
    fn list(&self, name: &str, n: usize) -> Vec<String> {
        self.numbered(name, n).map(split_tags).unwrap_or_default()
    }

    /// A checkbox: only `on` counts as set.
    fn flag(&self, name: &str, n: usize) -> bool {
        self.numbered(name, n) == Some("on")
    }

    fn required(&self, name: &str, n: usize) -> Result<&str> {
        self.numbered(name, n)
            .ok_or_else(|| RecipeError::missing(n, format!("{name}{n:02}")))
    }

    fn step(&self, filter: &str, n: usize) -> Result<FilterStep> {
        match filter {
            "select" | "rows" => {
                let queries = (1..=MAX_SELECT_QUERIES)
                    .filter_map(|m| self.get(&format!("select-query{n:02}-{m:02}")))
                    .map(String::from)
                    .collect();
                Ok(FilterStep::Select {
                    queries,
                    reverse: self.flag("select-reverse", n),
                })
            }
            "cut" | "column" => Ok(FilterStep::Cut {
                include: self.list("cut-include-tags", n),
                exclude: self.list("cut-exclude-tags", n),
            }),
            "count" => {
                let tags = split_tags(self.required("count-tags", n)?);
                if tags.is_empty() {
                    return Err(RecipeError::missing(n, format!("count-tags{n:02}")));
                }
                Ok(FilterStep::Count {
                    tags,
                    aggregate: self.numbered("count-aggregate-tag", n).map(String::from),
                })
            }
            "rename" => {
                let index = match self.numbered("rename-index", n) {
                    Some(value) => Some(value.parse::<usize>().map_err(|_| {
                        RecipeError::invalid(format!("rename-index{n:02}"), value)
                    })?),
                    None => None,
                };
                Ok(FilterStep::Rename {
                    pattern: self.required("rename-oldtag", n)?.to_string(),
                    tagspec: with_hash(self.required("rename-newtag", n)?),
                    header: self.numbered("rename-header", n).map(String::from),
                    index,
                })
            }
            "index" => Ok(FilterStep::Index {
                pattern: self.required("index-tags", n)?.to_string(),
            }),
            "sort" => Ok(FilterStep::Sort {
                tags: self.list("sort-tags", n),
                reverse: self.flag("sort-reverse", n),
            }),
            "add" => Ok(FilterStep::Add {
                tagspec: with_hash(self.required("add-tag", n)?),
                header: self.numbered("add-header", n).map(String::from),
                value: self
                    .numbered("add-value", n)
                    .unwrap_or_default()
                    .to_string(),
                before: self.flag("add-before", n),
            }),
            "clean" => Ok(FilterStep::Clean {
                whitespace: self.list("clean-whitespace-tags", n),
                upper: self.list("clean-upper-tags", n),
                lower: self.list("clean-lower-tags", n),
            }),
            "cache" => Ok(FilterStep::Cache),
            other => Err(RecipeError::UnknownFilter {
                step: n,
                name: other.to_string(),
            }),
        }
    }
}
