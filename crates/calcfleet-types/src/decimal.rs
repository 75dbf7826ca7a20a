//! Canonical decimal text handling.
//!
//! Every number that crosses a service boundary goes through
//! [`format_decimal`]: trailing zeros trimmed, no trailing `.`, never
//! scientific notation, and exactly `0` for the zero value.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ArithmeticError;

/// Render a decimal in canonical text form.
pub fn format_decimal(value: Decimal) -> String {
    let text = value.normalize().to_string();
    if text.is_empty() {
        "0".to_string()
    } else {
        text
    }
}

/// Parse canonical (or merely reasonable) decimal text.
pub fn parse_decimal(text: &str) -> Result<Decimal, ArithmeticError> {
    Decimal::from_str(text.trim()).map_err(|_| ArithmeticError::InvalidNumber(text.to_string()))
}

/// Collect every signed-decimal-looking substring in free-form text, in
/// order of appearance.
pub fn extract_decimals(text: &str) -> Vec<Decimal> {
    let pattern = Regex::new(r"[-+]?\d+(?:\.\d+)?").expect("numeric pattern is valid");
    pattern
        .find_iter(text)
        .filter_map(|m| Decimal::from_str(m.as_str()).ok())
        .collect()
}

/// Find the last signed-decimal-looking substring in free-form text.
///
/// Remote agents reply in natural language; the convention across the
/// cluster is that the value reported last wins. Returns `None` when no
/// substring parses as a decimal.
pub fn extract_last_decimal(text: &str) -> Option<Decimal> {
    extract_decimals(text).pop()
}
