//! Comparison operators for row predicates.
//!
//! The [`Op`] enum covers the operators allowed in a predicate
//! expression such as `#sector=WASH` or `#affected>=1000`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::HxlError;

/// Comparison operator for a row predicate.
///
/// - **Equality**: `Eq` (`=`), `Ne` (`!=`)
/// - **Ordering**: `Lt` (`<`), `Lte` (`<=`), `Gt` (`>`), `Gte` (`>=`)
/// - **Regex**: `Matches` (`~`), `NotMatches` (`!~`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Value matches a regular expression.
    Matches,
    /// Value does not match a regular expression.
    NotMatches,
}

impl Op {
    /// Every operator, longest symbols first.
    pub const ALL: [Op; 8] = [
        Op::Ne,
        Op::NotMatches,
        Op::Lte,
        Op::Gte,
        Op::Eq,
        Op::Lt,
        Op::Gt,
        Op::Matches,
    ];

    /// Returns `true` for `~` and `!~`.
    pub fn is_regex(self) -> bool {
        matches!(self, Op::Matches | Op::NotMatches)
    }

    /// Evaluates a comparison given an ordering result.
    ///
    /// Regex operators never match an ordering.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Matches | Op::NotMatches => false,
        }
    }

    /// Returns the symbol of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Matches => "~",
            Op::NotMatches => "!~",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = HxlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| HxlError::BadPredicate {
                input: s.to_string(),
            })
    }
}
