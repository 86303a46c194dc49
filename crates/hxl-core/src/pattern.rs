//! Tag patterns for selecting columns.
//!
//! A pattern looks like a HXL tagspec, except that it may also contain
//! `-` attributes that must be *absent*. `#org+funder-impl` matches any
//! column tagged `#org` that has `+funder` and does not have `+impl`;
//! other attributes are ignored.
//!
//! | Pattern | Matches | Does not match |
//! |---------|---------|----------------|
//! | `#adm1` | `#adm1`, `#adm1+code`, `#adm1+name` | `#adm2` |
//! | `#adm1-code` | `#adm1`, `#adm1+name` | `#adm1+code` |
//! | `#adm1+name-fr` | `#adm1+name`, `#adm1+name+en` | `#adm1+name+fr` |

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::column::Column;
use crate::diagnostics::{Diagnostics, Strictness};
use crate::error::{HxlError, Result};

static PATTERN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#?([A-Za-z][A-Za-z0-9_]*)((?:\s*[+-][A-Za-z][A-Za-z0-9_]*)*)\s*$")
        .expect("static pattern regex")
});

static PATTERN_ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([+-])([A-Za-z][A-Za-z0-9_]*)")
        .expect("static attribute regex")
});

static TAG_SHAPED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#").expect("static tag regex"));

/// A compiled pattern for matching columns.
///
/// You rarely need to build one by hand: every operation that takes a
/// pattern also accepts a string (see [`AsPattern`]). Precompiling with
/// [`Pattern::parse`] pays off in loops, since string patterns are
/// compiled again on every call.
///
/// # Example
///
/// ```
/// use hxl_core::{Column, Pattern};
///
/// let pattern = Pattern::parse("#org+funder-impl").unwrap();
/// assert!(pattern.matches(&Column::parse("#org+funder", None).unwrap()));
/// assert!(!pattern.matches(&Column::parse("#org+funder+impl", None).unwrap()));
/// assert!(!pattern.matches(&Column::parse("#org", None).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    tag: String,
    include_attributes: BTreeSet<String>,
    exclude_attributes: BTreeSet<String>,
}

impl Pattern {
    /// Parses a pattern, returning an error on bad syntax.
    ///
    /// The leading `#` is optional: `org+funder` and `#org+funder` are
    /// the same pattern.
    pub fn parse(input: &str) -> Result<Pattern> {
        if input.trim().is_empty() {
            return Err(HxlError::EmptyPattern);
        }
        let caps = PATTERN_RE
            .captures(input)
            .ok_or_else(|| HxlError::bad_pattern(input))?;

        let mut include_attributes = BTreeSet::new();
        let mut exclude_attributes = BTreeSet::new();
        for attr in PATTERN_ATTRIBUTE_RE.captures_iter(&caps[2]) {
            let name = attr[2].to_string();
            if &attr[1] == "+" {
                include_attributes.insert(name);
            } else {
                exclude_attributes.insert(name);
            }
        }

        Ok(Pattern {
            tag: format!("#{}", &caps[1]),
            include_attributes,
            exclude_attributes,
        })
    }

    /// Parses a pattern with an explicit failure policy.
    ///
    /// With [`Strictness::Lenient`], a bad pattern is reported to
    /// `diagnostics` and `Ok(None)` is returned.
    pub fn parse_with(
        input: &str,
        strictness: Strictness,
        diagnostics: &Diagnostics,
    ) -> Result<Option<Pattern>> {
        strictness.resolve(Pattern::parse(input), diagnostics)
    }

    /// Parses a pattern, reporting failures instead of returning them.
    pub fn parse_lenient(input: &str, diagnostics: &Diagnostics) -> Option<Pattern> {
        Pattern::parse(input)
            .map_err(|err| diagnostics.report(&err))
            .ok()
    }

    /// Parses a comma-separated list of patterns, e.g. `"org, #sector+code"`.
    ///
    /// Blank entries are skipped. Fails on the first bad entry.
    pub fn parse_list(input: &str) -> Result<Vec<Pattern>> {
        input
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Pattern::parse)
            .collect()
    }

    /// The tag, with its leading `#`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes that must be present.
    pub fn include_attributes(&self) -> &BTreeSet<String> {
        &self.include_attributes
    }

    /// Attributes that must be absent.
    pub fn exclude_attributes(&self) -> &BTreeSet<String> {
        &self.exclude_attributes
    }

    /// Tests a column against this pattern.
    pub fn matches(&self, column: &Column) -> bool {
        if self.tag != column.tag() {
            return false;
        }
        let attributes = column.attributes();
        self.include_attributes.is_subset(attributes)
            && self.exclude_attributes.is_disjoint(attributes)
    }

    /// Tests an optional column; untagged columns never match.
    pub fn matches_opt(&self, column: Option<&Column>) -> bool {
        column.is_some_and(|column| self.matches(column))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        for attribute in &self.include_attributes {
            write!(f, "+{}", attribute)?;
        }
        for attribute in &self.exclude_attributes {
            write!(f, "-{}", attribute)?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = HxlError;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

/// Anything usable as a tag pattern: a compiled [`Pattern`] (used
/// as-is) or a string (compiled on the fly).
pub trait AsPattern {
    /// Returns the compiled pattern, failing on bad syntax.
    fn as_pattern(&self) -> Result<Cow<'_, Pattern>>;
}

impl AsPattern for Pattern {
    fn as_pattern(&self) -> Result<Cow<'_, Pattern>> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsPattern for str {
    fn as_pattern(&self) -> Result<Cow<'_, Pattern>> {
        Pattern::parse(self).map(Cow::Owned)
    }
}

impl AsPattern for String {
    fn as_pattern(&self) -> Result<Cow<'_, Pattern>> {
        self.as_str().as_pattern()
    }
}

impl<T: AsPattern + ?Sized> AsPattern for &T {
    fn as_pattern(&self) -> Result<Cow<'_, Pattern>> {
        (**self).as_pattern()
    }
}

/// Compiles a pattern leniently: failures go to `diagnostics` and
/// yield `None`, which callers treat as "matches nothing".
pub(crate) fn compile_lenient<'a, P>(
    pattern: &'a P,
    diagnostics: &Diagnostics,
) -> Option<Cow<'a, Pattern>>
where
    P: AsPattern + ?Sized,
{
    pattern
        .as_pattern()
        .map_err(|err| diagnostics.report(&err))
        .ok()
}

/// Returns `true` if a raw cell looks like a hashtag and parses as one.
pub(crate) fn is_tag_shaped(cell: &str) -> bool {
    TAG_SHAPED_RE.is_match(cell) && Pattern::parse(cell).is_ok()
}

/// Several patterns at once, e.g. the group-by list of a count.
///
/// A single string is read as a comma-separated list.
pub trait IntoPatterns {
    /// Returns the raw entries; compilation (strict or lenient) is up to
    /// the caller.
    fn into_pattern_specs(self) -> Vec<PatternSpec>;
}

/// One entry of an [`IntoPatterns`] list, compiled or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSpec {
    Compiled(Pattern),
    Text(String),
}

impl PatternSpec {
    /// Compiles this entry strictly.
    pub fn into_pattern(self) -> Result<Pattern> {
        match self {
            PatternSpec::Compiled(pattern) => Ok(pattern),
            PatternSpec::Text(text) => Pattern::parse(&text),
        }
    }

    /// Compiles this entry under the given policy.
    pub fn compile(
        self,
        strictness: Strictness,
        diagnostics: &Diagnostics,
    ) -> Result<Option<Pattern>> {
        match self {
            PatternSpec::Compiled(pattern) => Ok(Some(pattern)),
            PatternSpec::Text(text) => Pattern::parse_with(&text, strictness, diagnostics),
        }
    }
}

/// Compiles a pattern list, failing on the first bad entry.
pub(crate) fn compile_strict<P: IntoPatterns>(patterns: P) -> Result<Vec<Pattern>> {
    patterns
        .into_pattern_specs()
        .into_iter()
        .map(PatternSpec::into_pattern)
        .collect()
}

/// Compiles a pattern list, reporting and dropping bad entries.
pub(crate) fn compile_lenient_all<P: IntoPatterns>(
    patterns: P,
    diagnostics: &Diagnostics,
) -> Vec<Pattern> {
    patterns
        .into_pattern_specs()
        .into_iter()
        .filter_map(|spec| {
            spec.into_pattern()
                .map_err(|err| diagnostics.report(&err))
                .ok()
        })
        .collect()
}

fn split_list(input: &str) -> Vec<PatternSpec> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| PatternSpec::Text(part.to_string()))
        .collect()
}

impl IntoPatterns for &str {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        split_list(self)
    }
}

impl IntoPatterns for String {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        split_list(&self)
    }
}

impl IntoPatterns for Pattern {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        vec![PatternSpec::Compiled(self)]
    }
}

impl IntoPatterns for Vec<Pattern> {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        self.into_iter().map(PatternSpec::Compiled).collect()
    }
}

impl IntoPatterns for &[Pattern] {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        self.iter().cloned().map(PatternSpec::Compiled).collect()
    }
}

impl IntoPatterns for Vec<&str> {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        self.into_iter().flat_map(split_list).collect()
    }
}

impl IntoPatterns for Vec<String> {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        self.iter().flat_map(|s| split_list(s)).collect()
    }
}

impl IntoPatterns for &[&str] {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        self.iter().flat_map(|s| split_list(s)).collect()
    }
}

impl<const N: usize> IntoPatterns for [&str; N] {
    fn into_pattern_specs(self) -> Vec<PatternSpec> {
        self.into_iter().flat_map(split_list).collect()
    }
}
