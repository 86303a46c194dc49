//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur when parsing tags, building datasets or
/// running filters.
#[derive(Debug, Error)]
pub enum HxlError {
    /// A tag pattern did not match the `#tag+inc-exc` grammar.
    #[error("bad tag pattern: {input}")]
    BadPattern { input: String },

    /// An empty string was supplied where a tag pattern was required.
    #[error("no tag pattern provided")]
    EmptyPattern,

    /// A column tagspec did not match the `#tag+attr` grammar.
    #[error("bad tag specification: {input}")]
    BadTagspec { input: String },

    /// No row in the scan window qualified as the hashtag row.
    #[error("no HXL hashtag row found in the first {scanned} rows")]
    NoTagRow { scanned: usize },

    /// A count was requested without any group-by patterns.
    #[error("no tag patterns specified for count")]
    NoCountPatterns,

    /// A row predicate expression could not be parsed.
    #[error("bad predicate: {input}")]
    BadPredicate { input: String },

    /// Invalid regular expression in a `~` or `!~` predicate.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A regex predicate was applied to a missing cell.
    #[error("cannot match a regular expression against an empty cell for {pattern}")]
    NonStringCell { pattern: String },
}

impl HxlError {
    pub(crate) fn bad_pattern(input: impl Into<String>) -> Self {
        Self::BadPattern {
            input: input.into(),
        }
    }

    pub(crate) fn bad_tagspec(input: impl Into<String>) -> Self {
        Self::BadTagspec {
            input: input.into(),
        }
    }

    /// Returns `true` for errors raised while parsing a pattern or tagspec.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            HxlError::BadPattern { .. } | HxlError::EmptyPattern | HxlError::BadTagspec { .. }
        )
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, HxlError>;
