//! Degree-minute notation (`30°15'`)

use lazy_regex::{lazy_regex, Lazy, Regex};

use crate::normalize::Primitive;
use crate::number::parse_number_str;

/// A whole cell in degree-minute form: degrees, glyph or whitespace, minutes
static DEGREE_MINUTE: Lazy<Regex> =
    lazy_regex!(r"^\s*([+-]?\d+)(?:\s*°\s*|\s+)(\d+)\s*'?\s*$");

/// Read decimal degrees from a number or a degree-minute string
///
/// Numbers are already decimal degrees. Strings that are not in degree-minute
/// form fall back to [`parse_number_str`](crate::number::parse_number_str).
pub fn decode(raw: &Primitive<'_>) -> Option<f64> {
    match raw {
        Primitive::Number(n) => Some(*n).filter(|n| !n.is_nan()),
        Primitive::Text(s) => decode_str(s),
    }
}

/// String half of [`decode`]
pub fn decode_str(s: &str) -> Option<f64> {
    let Some(caps) = DEGREE_MINUTE.captures(s) else {
        return parse_number_str(s);
    };

    let degree_token = &caps[1];
    let degrees: f64 = degree_token.trim_start_matches(['+', '-']).parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let magnitude = degrees + minutes / 60.0;

    Some(if degree_token.starts_with('-') {
        -magnitude
    } else {
        magnitude
    })
}

/// Format decimal degrees as `DD°MM'`
///
/// The minute part is rounded on its own and is not carried into the degree
/// part, so `30.9999` encodes as `30°60'`.
pub fn encode(decimal_degrees: f64) -> String {
    let sign = if decimal_degrees < 0.0 { "-" } else { "" };
    let magnitude = decimal_degrees.abs();
    let degrees = magnitude.floor();
    let minutes = ((magnitude - degrees) * 60.0).round();
    format!("{}{:02}°{:02}'", sign, degrees as u64, minutes as u64)
}
