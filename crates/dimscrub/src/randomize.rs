//! Replacement value generation
//!
//! Every generator takes its randomness as a `&mut R: Rng`, so runs can be
//! made reproducible by passing a seeded generator.

use rand::Rng;

use crate::tolerance::ResolvedWindow;

/// Upper bound on out-of-spec candidates drawn for one value
pub const MAX_ATTEMPTS: usize = 50;

/// Attempts after which a candidate may cross to the other side of the window
pub const SIDE_LOCK_ATTEMPTS: usize = 20;

/// Candidate offsets, in precision steps
const OFFSETS: [i32; 6] = [-3, -2, -1, 1, 2, 3];

/// Fraction of the span kept clear of each bound when sampling in-spec values
const INSET: f64 = 0.05;

/// Rounding unit of a regenerated value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Whole arc-minutes (angular rows)
    ArcMinute,
    /// Fixed number of decimal places (linear rows)
    Decimals(u32),
}

impl Precision {
    pub fn for_row(is_angular: bool) -> Self {
        if is_angular {
            Precision::ArcMinute
        } else {
            Precision::Decimals(2)
        }
    }

    /// Size of one unit
    pub fn step(self) -> f64 {
        match self {
            Precision::ArcMinute => 1.0 / 60.0,
            Precision::Decimals(places) => 10f64.powi(-(places as i32)),
        }
    }

    pub fn round(self, value: f64) -> f64 {
        match self {
            Precision::ArcMinute => (value * 60.0).round() / 60.0,
            Precision::Decimals(places) => {
                let factor = 10f64.powi(places as i32);
                (value * factor).round() / factor
            }
        }
    }
}

/// Where a value sits relative to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecStatus {
    InSpec,
    Above,
    Below,
}

impl SpecStatus {
    pub fn of(value: f64, window: &ResolvedWindow) -> Self {
        if value > window.upper {
            SpecStatus::Above
        } else if value < window.lower {
            SpecStatus::Below
        } else {
            SpecStatus::InSpec
        }
    }

    pub fn is_in_spec(self) -> bool {
        self == SpecStatus::InSpec
    }
}

/// Draw a value inside `[lower, upper]`
///
/// Samples the window minus a 5% inset on each side, or the whole window
/// when the inset leaves nothing. The sample is rounded to `precision`
/// unless rounding would push it out of the window.
pub fn generate_in_spec<R: Rng + ?Sized>(
    rng: &mut R,
    lower: f64,
    upper: f64,
    precision: Precision,
) -> f64 {
    let span = upper - lower;
    if span <= 0.0 || !span.is_finite() {
        return lower;
    }

    let safe_min = lower + INSET * span;
    let safe_max = upper - INSET * span;
    let sample = if safe_max > safe_min {
        rng.gen_range(safe_min..=safe_max)
    } else {
        rng.gen_range(lower..=upper)
    };

    let rounded = precision.round(sample);
    if rounded < lower || rounded > upper {
        sample
    } else {
        rounded
    }
}

/// Nudge an out-of-spec value by a few precision steps, keeping it out of spec
///
/// Candidates are rounded to `precision` before they are judged, so the
/// accepted value is the one that gets written.
/// For the first [`SIDE_LOCK_ATTEMPTS`] draws a candidate must also stay on
/// the same side of the window. Returns `original` unchanged when no
/// candidate is accepted within [`MAX_ATTEMPTS`].
pub fn generate_out_of_spec<R: Rng + ?Sized>(
    rng: &mut R,
    original: f64,
    window: &ResolvedWindow,
    precision: Precision,
) -> f64 {
    let side = SpecStatus::of(original, window);
    let step = precision.step();

    for attempt in 1..=MAX_ATTEMPTS {
        let offset = OFFSETS[rng.gen_range(0..OFFSETS.len())];
        let candidate = precision.round(original + offset as f64 * step);

        let status = SpecStatus::of(candidate, window);
        if !status.is_in_spec()
            && (status == side || attempt > SIDE_LOCK_ATTEMPTS)
            && candidate != original
        {
            return candidate;
        }
    }

    tracing::debug!(
        value = original,
        attempts = MAX_ATTEMPTS,
        "no out-of-spec candidate accepted; keeping original"
    );
    original
}

/// Produce a replacement for `value` with the same verdict against `window`
///
/// Returns the replacement and whether `value` was in spec.
pub fn regenerate<R: Rng + ?Sized>(rng: &mut R, value: f64, window: &ResolvedWindow) -> (f64, bool) {
    let precision = window.precision();
    if window.contains(value) {
        (
            generate_in_spec(rng, window.lower, window.upper, precision),
            true,
        )
    } else {
        (generate_out_of_spec(rng, value, window, precision), false)
    }
}
