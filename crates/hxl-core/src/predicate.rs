//! Row predicates for [`RowFilter`](crate::RowFilter).
//!
//! A [`Predicate`] is either scoped to a tag pattern (its test runs on
//! every value whose column matches) or applies to the whole row.
//! String expressions such as `#sector=WASH` or `adm1~^coast` compile
//! to pattern-scoped predicates.
//!
//! Expression values are compared after [`norm`](crate::norm), so
//! `#sector=wash` matches a cell containing `" WASH "`.

use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HxlError, Result};
use crate::op::Op;
use crate::pattern::{AsPattern, Pattern};
use crate::row::Row;
use crate::value::{compare_values, norm};

static EXPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^!=~<>]+?)\s*(!=|!~|<=|>=|=|~|<|>)(.*)$")
        .expect("static predicate regex")
});

/// Test run against a single cell value.
pub type ValueTest = Rc<dyn Fn(Option<&str>) -> bool>;

/// Test run against a whole row.
pub type RowTest = Rc<dyn Fn(&Row) -> bool>;

/// A compiled `<op><value>` comparison.
#[derive(Debug, Clone)]
pub struct Condition {
    op: Op,
    expected: Expected,
}

#[derive(Debug, Clone)]
enum Expected {
    Text(Option<String>),
    Regex(Regex),
}

impl Condition {
    /// Compiles a comparison. Regex operators compile `expected` as a
    /// regular expression (after normalisation).
    pub fn new(op: Op, expected: &str) -> Result<Self> {
        let normalized = norm(Some(expected));
        let expected = if op.is_regex() {
            Expected::Regex(Regex::new(normalized.as_deref().unwrap_or(""))?)
        } else {
            Expected::Text(normalized)
        };
        Ok(Condition { op, expected })
    }

    pub fn op(&self) -> Op {
        self.op
    }

    /// Evaluates the comparison against a cell.
    ///
    /// Regex operators fail on a missing cell; ordering operators never
    /// match a missing cell.
    pub fn matches(&self, value: Option<&str>, pattern: &Pattern) -> Result<bool> {
        let actual = norm(value);
        match &self.expected {
            Expected::Regex(regex) => {
                if value.is_none() {
                    return Err(HxlError::NonStringCell {
                        pattern: pattern.to_string(),
                    });
                }
                let found = regex.is_match(actual.as_deref().unwrap_or(""));
                Ok(if self.op == Op::NotMatches { !found } else { found })
            }
            Expected::Text(expected) => Ok(match self.op {
                Op::Eq => actual == *expected,
                Op::Ne => actual != *expected,
                op => match (actual.as_deref(), expected.as_deref()) {
                    (Some(a), Some(b)) => op.eval_ordering(compare_values(a, b)),
                    _ => false,
                },
            }),
        }
    }
}

/// How a pattern-scoped predicate tests each value.
#[derive(Clone)]
pub enum ValueCheck {
    /// A compiled operator comparison.
    Condition(Condition),
    /// A caller-supplied function.
    Custom(ValueTest),
}

impl fmt::Debug for ValueCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCheck::Condition(condition) => {
                f.debug_tuple("Condition").field(condition).finish()
            }
            ValueCheck::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A single row-selection rule.
///
/// # Example
///
/// ```
/// use hxl_core::Predicate;
///
/// let by_sector = Predicate::parse("#sector=WASH").unwrap();
/// let big = Predicate::value("#affected", |v| {
///     v.and_then(|v| v.parse::<u32>().ok()).is_some_and(|n| n > 1000)
/// })
/// .unwrap();
/// let has_org = Predicate::row(|row| row.get("#org").ok().flatten().is_some());
/// # let _ = (by_sector, big, has_org);
/// ```
#[derive(Clone)]
pub enum Predicate {
    /// Test every value whose column matches `pattern`.
    Value { pattern: Pattern, check: ValueCheck },
    /// Test the row once.
    Row(RowTest),
}

impl Predicate {
    /// Parses an expression of the form `<pattern><op><value>`.
    ///
    /// Supported operators: `=`, `!=`, `<`, `<=`, `>`, `>=`, `~`, `!~`.
    pub fn parse(expression: &str) -> Result<Predicate> {
        let caps = EXPRESSION_RE
            .captures(expression)
            .ok_or_else(|| HxlError::BadPredicate {
                input: expression.to_string(),
            })?;
        let pattern = Pattern::parse(&caps[1])?;
        let op: Op = caps[2].parse()?;
        Ok(Predicate::Value {
            pattern,
            check: ValueCheck::Condition(Condition::new(op, &caps[3])?),
        })
    }

    /// Normalised equality against a plain string.
    pub fn equals<P: AsPattern + ?Sized>(pattern: &P, expected: &str) -> Result<Predicate> {
        Predicate::compare(pattern, Op::Eq, expected)
    }

    /// Operator comparison against a value.
    pub fn compare<P: AsPattern + ?Sized>(
        pattern: &P,
        op: Op,
        expected: &str,
    ) -> Result<Predicate> {
        Ok(Predicate::Value {
            pattern: pattern.as_pattern()?.into_owned(),
            check: ValueCheck::Condition(Condition::new(op, expected)?),
        })
    }

    /// Custom test over each matching value.
    pub fn value<P, F>(pattern: &P, test: F) -> Result<Predicate>
    where
        P: AsPattern + ?Sized,
        F: Fn(Option<&str>) -> bool + 'static,
    {
        Ok(Predicate::Value {
            pattern: pattern.as_pattern()?.into_owned(),
            check: ValueCheck::Custom(Rc::new(test)),
        })
    }

    /// Custom test over the whole row.
    pub fn row<F>(test: F) -> Predicate
    where
        F: Fn(&Row) -> bool + 'static,
    {
        Predicate::Row(Rc::new(test))
    }

    /// Returns `true` if the row satisfies this predicate.
    ///
    /// Pattern-scoped predicates succeed as soon as one matching value
    /// passes.
    pub fn test(&self, row: &Row) -> Result<bool> {
        match self {
            Predicate::Row(test) => Ok(test(row)),
            Predicate::Value { pattern, check } => {
                for value in row.get_all(pattern)? {
                    let passed = match check {
                        ValueCheck::Condition(condition) => condition.matches(value, pattern)?,
                        ValueCheck::Custom(test) => test(value),
                    };
                    if passed {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Value { pattern, check } => f
                .debug_struct("Value")
                .field("pattern", &pattern.to_string())
                .field("check", check)
                .finish(),
            Predicate::Row(_) => f.write_str("Row(..)"),
        }
    }
}

/// One or more predicates: an expression string, a [`Predicate`], or a
/// list of either.
pub trait IntoPredicates {
    fn into_predicates(self) -> Result<Vec<Predicate>>;
}

impl IntoPredicates for Predicate {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        Ok(vec![self])
    }
}

impl IntoPredicates for Vec<Predicate> {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        Ok(self)
    }
}

impl IntoPredicates for &str {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        Ok(vec![Predicate::parse(self)?])
    }
}

impl IntoPredicates for String {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        self.as_str().into_predicates()
    }
}

impl IntoPredicates for Vec<&str> {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        self.into_iter().map(Predicate::parse).collect()
    }
}

impl IntoPredicates for Vec<String> {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        self.iter().map(|s| Predicate::parse(s)).collect()
    }
}

impl IntoPredicates for &[&str] {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        self.iter().map(|s| Predicate::parse(s)).collect()
    }
}

impl<const N: usize> IntoPredicates for [&str; N] {
    fn into_predicates(self) -> Result<Vec<Predicate>> {
        self.into_iter().map(Predicate::parse).collect()
    }
}
