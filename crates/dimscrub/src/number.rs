//! Linear number parsing

use crate::normalize::Primitive;

/// Interpret a primitive as a finite number
///
/// Strings are trimmed and the first comma is read as a decimal point.
/// Anything that is not a complete float literal afterwards yields `None`.
pub fn parse_number(raw: &Primitive<'_>) -> Option<f64> {
    match raw {
        Primitive::Number(n) => Some(*n).filter(|n| !n.is_nan()),
        Primitive::Text(s) => parse_number_str(s),
    }
}

/// String half of [`parse_number`]
pub fn parse_number_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
