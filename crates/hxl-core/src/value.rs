//! Cell value helpers: normalisation, numeric coercion and comparison.
//!
//! Cells are always text. Anything numeric (min/max, aggregates,
//! ordering predicates) goes through [`parse_number`] first and falls
//! back to string comparison when a cell is not a number.

use std::cmp::Ordering;

/// Normalises case and whitespace in a cell value.
///
/// Leading and trailing whitespace is removed, every internal run of
/// whitespace becomes a single space, and the result is lowercased.
/// Returns `None` for a missing or blank value.
///
/// ```
/// use hxl_core::norm;
///
/// assert_eq!(norm(Some("  Coastal \t Region ")).as_deref(), Some("coastal region"));
/// assert_eq!(norm(Some("   ")), None);
/// assert_eq!(norm(None), None);
/// ```
pub fn norm(value: Option<&str>) -> Option<String> {
    let value = value?;
    let words: Vec<&str> = value.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" ").to_lowercase())
}

/// Parses a cell as a finite number.
///
/// The whole (trimmed) value must be a number; `"12abc"`, `""`, `"NaN"`
/// and `"inf"` are not numbers.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns `true` if the value parses as a finite number.
pub fn is_number(value: &str) -> bool {
    parse_number(value).is_some()
}

/// Renders a number the way it would be written in a spreadsheet cell.
///
/// Whole numbers have no fractional part (`3`, not `3.0`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

/// Compares two cell values.
///
/// When both sides parse as numbers they are compared numerically,
/// otherwise the raw strings are compared lexicographically.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}
