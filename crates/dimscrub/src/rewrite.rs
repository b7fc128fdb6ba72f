//! Per-cell rewriting
//!
//! A target cell holds either a single value (a number, a lone numeric token,
//! or for angular rows anything the angle codec reads) or free text with
//! values embedded in it. Single values are replaced wholesale; embedded
//! values are replaced token by token and the surrounding text is kept.

use lazy_regex::{lazy_regex, Lazy, Regex};
use rand::Rng;
use regex::Captures;

use dimscrub_core::{Cell, CellAddress, CellValue, NumberFormat};

use crate::angle;
use crate::normalize::{normalize, Primitive};
use crate::number::parse_number_str;
use crate::randomize::regenerate;
use crate::stats::ProcessingStats;
use crate::tolerance::ResolvedWindow;

/// A cell that is exactly one linear number
static SINGLE_NUMBER: Lazy<Regex> = lazy_regex!(r"^\s*[+-]?\d+(?:[.,]\d+)?\s*$");

/// Linear numbers inside free text
static LINEAR_TOKEN: Lazy<Regex> = lazy_regex!(r"[+-]?\d+(?:[.,]\d+)?");

/// Degree-minute values inside free text
static ANGULAR_TOKEN: Lazy<Regex> = lazy_regex!(r"\d+(?:\s*°\s*|\s+)\d+'?");

/// What a rewritten cell is set to
#[derive(Debug, Clone, PartialEq)]
enum Replacement {
    /// Linear single value, with the display format to force on it
    Number(f64, Option<NumberFormat>),
    /// Angular single value or rewritten text
    Text(String),
}

/// Rewrite one target cell against the row's window
///
/// Returns whether the cell was changed. Merge followers, empty cells and
/// text without any readable value are left alone, as are values whose
/// written form would read back with a different verdict.
pub fn rewrite_cell<R: Rng + ?Sized>(
    cell: &mut Cell,
    addr: CellAddress,
    window: &ResolvedWindow,
    rng: &mut R,
    stats: &mut ProcessingStats,
) -> bool {
    if cell.is_merge_follower() {
        return false;
    }

    let replacement = match normalize(&cell.value) {
        None => None,
        Some(raw) if raw.as_text().is_some_and(|s| s.trim().is_empty()) => None,
        Some(raw) => match single_value(&raw, window) {
            Some(value) => rewrite_single(value, window, rng, stats),
            None => raw
                .as_text()
                .and_then(|text| rewrite_composite(text, window, rng, stats)),
        },
    };

    let Some(replacement) = replacement else {
        return false;
    };

    tracing::trace!(cell = %addr, from = %cell.value, to = ?replacement, "rewrote cell");
    match replacement {
        Replacement::Number(n, format) => {
            cell.set_value(CellValue::Number(n));
            if let Some(format) = format {
                cell.set_number_format(format);
            }
        }
        Replacement::Text(s) => cell.set_value(CellValue::string(s)),
    }
    stats.processed_cells += 1;
    true
}

/// The cell's value when it holds exactly one measurement
fn single_value(raw: &Primitive<'_>, window: &ResolvedWindow) -> Option<f64> {
    match raw {
        Primitive::Number(n) => Some(*n).filter(|n| !n.is_nan()),
        Primitive::Text(s) if window.is_angular => angle::decode_str(s),
        Primitive::Text(s) if SINGLE_NUMBER.is_match(s) => parse_number_str(s),
        Primitive::Text(_) => None,
    }
}

fn rewrite_single<R: Rng + ?Sized>(
    value: f64,
    window: &ResolvedWindow,
    rng: &mut R,
    stats: &mut ProcessingStats,
) -> Option<Replacement> {
    if window.is_angular {
        return rewrite_rendered(value, window, rng, stats, angle::encode, angle::decode_str)
            .map(Replacement::Text);
    }

    let (new_value, in_spec) = regenerate(rng, value, window);
    stats.record(in_spec);
    // 0.00 would display a sample kept unrounded as a different number
    let format = (window.precision().round(new_value) == new_value)
        .then(NumberFormat::two_decimals);
    Some(Replacement::Number(new_value, format))
}

/// Regenerate `value` and render it as text
///
/// The rendered text must read back with the original verdict. That fails
/// only for windows narrower than the rounding unit, and the value is then
/// kept as it was.
fn rewrite_rendered<R, F, P>(
    value: f64,
    window: &ResolvedWindow,
    rng: &mut R,
    stats: &mut ProcessingStats,
    render: F,
    read_back: P,
) -> Option<String>
where
    R: Rng + ?Sized,
    F: FnOnce(f64) -> String,
    P: FnOnce(&str) -> Option<f64>,
{
    let (new_value, in_spec) = regenerate(rng, value, window);
    let rendered = render(new_value);
    match read_back(&rendered) {
        Some(written) if window.contains(written) == in_spec => {
            stats.record(in_spec);
            Some(rendered)
        }
        _ => {
            tracing::debug!(
                value,
                rendered = %rendered,
                "written form changes the verdict; keeping value"
            );
            None
        }
    }
}

/// Replace every readable token of `text`; `None` when there is none
fn rewrite_composite<R: Rng + ?Sized>(
    text: &str,
    window: &ResolvedWindow,
    rng: &mut R,
    stats: &mut ProcessingStats,
) -> Option<Replacement> {
    let mut rewritten = 0usize;
    let result = if window.is_angular {
        ANGULAR_TOKEN.replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            let replaced = angle::decode_str(token).and_then(|value| {
                rewrite_rendered(
                    value,
                    window,
                    &mut *rng,
                    &mut *stats,
                    angle::encode,
                    angle::decode_str,
                )
            });
            match replaced {
                Some(replaced) => {
                    rewritten += 1;
                    replaced
                }
                None => token.to_string(),
            }
        })
    } else {
        LINEAR_TOKEN.replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            let comma = token.contains(',');
            let replaced = parse_number_str(token).and_then(|value| {
                rewrite_rendered(
                    value,
                    window,
                    &mut *rng,
                    &mut *stats,
                    |v| format_two_decimals(v, comma),
                    parse_number_str,
                )
            });
            match replaced {
                Some(replaced) => {
                    rewritten += 1;
                    replaced
                }
                None => token.to_string(),
            }
        })
    };

    if rewritten == 0 {
        tracing::trace!(text, "no value in text could be rewritten");
        return None;
    }
    Some(Replacement::Text(result.into_owned()))
}

fn format_two_decimals(value: f64, comma: bool) -> String {
    let formatted = format!("{:.2}", value);
    if comma {
        formatted.replacen('.', ",", 1)
    } else {
        formatted
    }
}
