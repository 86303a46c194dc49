//! Column definitions: a hashtag, its attributes and a display header.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{Diagnostics, Strictness};
use crate::error::{HxlError, Result};

static TAGSPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(#[A-Za-z][A-Za-z0-9_]*)((?:\s*\+[A-Za-z][A-Za-z0-9_]*)*)\s*$")
        .expect("static tagspec regex")
});

static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+([A-Za-z][A-Za-z0-9_]*)")
        .expect("static attribute regex")
});

#[derive(Debug, PartialEq, Eq, Hash)]
struct ColumnSpec {
    tag: String,
    attributes: BTreeSet<String>,
    header: Option<String>,
}

/// An immutable column definition.
///
/// `Column` is a reference-counted handle: cloning it is cheap and the
/// clone refers to the same record (see [`Column::same`]). Columns are
/// never modified in place; [`with_attribute`](Column::with_attribute)
/// and friends build a new record instead.
///
/// ```
/// use hxl_core::Column;
///
/// let column = Column::parse("#org+impl+code", Some("Implementer")).unwrap();
/// assert_eq!(column.tag(), "#org");
/// assert_eq!(column.display_tag(), "#org+code+impl");
/// assert_eq!(column.header(), Some("Implementer"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column(Rc<ColumnSpec>);

impl Column {
    /// Builds a column from parts.
    ///
    /// The tag is stored as given; prefer [`Column::parse`] for
    /// untrusted input.
    pub fn new<I, S>(tag: impl Into<String>, attributes: I, header: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column(Rc::new(ColumnSpec {
            tag: tag.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            header,
        }))
    }

    /// Parses a tagspec such as `#adm1+code`.
    ///
    /// Only `+` attributes are allowed and the leading `#` is required.
    pub fn parse(tagspec: &str, header: Option<&str>) -> Result<Column> {
        let caps = TAGSPEC_RE
            .captures(tagspec)
            .ok_or_else(|| HxlError::bad_tagspec(tagspec))?;
        let attributes = ATTRIBUTE_RE
            .captures_iter(&caps[2])
            .map(|attr| attr[1].to_string());
        Ok(Column::new(
            &caps[1],
            attributes,
            header.map(str::to_string),
        ))
    }

    /// Parses a tagspec with an explicit failure policy.
    pub fn parse_with(
        tagspec: &str,
        header: Option<&str>,
        strictness: Strictness,
        diagnostics: &Diagnostics,
    ) -> Result<Option<Column>> {
        strictness.resolve(Column::parse(tagspec, header), diagnostics)
    }

    /// Parses a tagspec, reporting failures instead of returning them.
    pub fn parse_lenient(
        tagspec: &str,
        header: Option<&str>,
        diagnostics: &Diagnostics,
    ) -> Option<Column> {
        Column::parse(tagspec, header)
            .map_err(|err| diagnostics.report(&err))
            .ok()
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn attributes(&self) -> &BTreeSet<String> {
        &self.0.attributes
    }

    pub fn header(&self) -> Option<&str> {
        self.0.header.as_deref()
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.0.attributes.contains(attribute)
    }

    /// The tag followed by every attribute in sorted order, e.g.
    /// `#org+funder+main`.
    pub fn display_tag(&self) -> String {
        let mut display = self.0.tag.clone();
        for attribute in &self.0.attributes {
            display.push('+');
            display.push_str(attribute);
        }
        display
    }

    /// A new column with one more attribute.
    pub fn with_attribute(&self, attribute: impl Into<String>) -> Column {
        let mut attributes = self.0.attributes.clone();
        attributes.insert(attribute.into());
        Column(Rc::new(ColumnSpec {
            tag: self.0.tag.clone(),
            attributes,
            header: self.0.header.clone(),
        }))
    }

    /// A new column with a different header.
    pub fn with_header(&self, header: Option<String>) -> Column {
        Column(Rc::new(ColumnSpec {
            tag: self.0.tag.clone(),
            attributes: self.0.attributes.clone(),
            header,
        }))
    }

    /// A new column from a tagspec, keeping this column's header.
    pub fn with_tagspec(&self, tagspec: &str) -> Result<Column> {
        Column::parse(tagspec, self.header())
    }

    /// Returns `true` if both handles refer to the same record.
    pub fn same(a: &Column, b: &Column) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_tag())
    }
}

/// The column list shared by a source and all of its rows.
///
/// `None` marks an untagged (spacer) column.
pub type Columns = Rc<[Option<Column>]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tagspec() {
        let column = Column::parse("#adm1+code", None).unwrap();
        assert_eq!(column.tag(), "#adm1");
        assert!(column.has_attribute("code"));
        assert_eq!(column.header(), None);
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let column = Column::parse("  #org +funder ", Some("Donor")).unwrap();
        assert_eq!(column.display_tag(), "#org+funder");
        assert_eq!(column.header(), Some("Donor"));
    }

    #[test]
    fn parse_rejects_exclusions_and_missing_hash() {
        assert!(matches!(
            Column::parse("#org-impl", None),
            Err(HxlError::BadTagspec { .. })
        ));
        assert!(Column::parse("org", None).is_err());
        assert!(Column::parse("", None).is_err());
    }

    #[test]
    fn parse_lenient_reports() {
        let diagnostics = Diagnostics::new();
        assert!(Column::parse_lenient("#org-impl", None, &diagnostics).is_none());
        assert!(
            Column::parse_with("#org-impl", None, Strictness::Strict, &diagnostics).is_err()
        );
    }

    #[test]
    fn display_tag_sorts_attributes() {
        let column = Column::parse("#org+main+funder", None).unwrap();
        assert_eq!(column.display_tag(), "#org+funder+main");
        assert_eq!(column.to_string(), "#org+funder+main");
        assert_eq!(Column::parse("#org", None).unwrap().display_tag(), "#org");
    }

    #[test]
    fn with_attribute_leaves_original_untouched() {
        let original = Column::parse("#org", Some("Org")).unwrap();
        let indexed = original.with_attribute("i0");
        assert_eq!(original.display_tag(), "#org");
        assert_eq!(indexed.display_tag(), "#org+i0");
        assert_eq!(indexed.header(), Some("Org"));
        assert!(!Column::same(&original, &indexed));
    }

    #[test]
    fn clone_shares_the_record() {
        let column = Column::parse("#org", None).unwrap();
        let handle = column.clone();
        assert!(Column::same(&column, &handle));

        let equal = Column::parse("#org", None).unwrap();
        assert_eq!(column, equal);
        assert!(!Column::same(&column, &equal));
    }

    #[test]
    fn with_tagspec_keeps_header() {
        let column = Column::parse("#org", Some("Org")).unwrap();
        let renamed = column.with_tagspec("#org+funder").unwrap();
        assert_eq!(renamed.display_tag(), "#org+funder");
        assert_eq!(renamed.header(), Some("Org"));
        assert!(column.with_tagspec("#org-impl").is_err());
    }

    #[test]
    fn with_header_replaces_header() {
        let column = Column::parse("#org", Some("Org")).unwrap();
        assert_eq!(column.with_header(None).header(), None);
        assert_eq!(
            column.with_header(Some("Agency".into())).header(),
            Some("Agency")
        );
    }
}
