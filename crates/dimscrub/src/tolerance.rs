//! Tolerance window latching
//!
//! Reports often define a tolerance once and merge the bound cells down over
//! several measurement rows, so only the first row of the group carries the
//! values. The window keeps the last bound seen in each column and applies it
//! to every following row until a row supplies a new one.

use dimscrub_core::{CellValue, Row};

use crate::angle;
use crate::normalize::{normalize, Primitive};
use crate::number::parse_number;
use crate::options::ScrubOptions;
use crate::randomize::Precision;

/// Bounds latched across rows plus the current row's classification
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToleranceWindow {
    upper: Option<f64>,
    lower: Option<f64>,
    is_angular: bool,
}

impl ToleranceWindow {
    /// Create a window with no bounds seen yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upper(&self) -> Option<f64> {
        self.upper
    }

    pub fn lower(&self) -> Option<f64> {
        self.lower
    }

    /// Classification of the row last passed to [`update`](Self::update)
    pub fn is_angular(&self) -> bool {
        self.is_angular
    }

    /// Forget all latched bounds
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Take one row's description and bound cells into account
    ///
    /// The classification is recomputed from this row's description alone.
    /// Each bound replaces the latched one only when it decodes.
    pub fn update(
        &mut self,
        description: Option<&CellValue>,
        upper: Option<&CellValue>,
        lower: Option<&CellValue>,
    ) {
        let is_angular = is_angular_description(description.and_then(normalize).as_ref());
        let decode = |value: Option<&CellValue>| {
            let raw = value.and_then(normalize)?;
            if is_angular {
                angle::decode(&raw)
            } else {
                parse_number(&raw)
            }
        };

        self.is_angular = is_angular;
        if let Some(upper) = decode(upper) {
            self.upper = Some(upper);
        }
        if let Some(lower) = decode(lower) {
            self.lower = Some(lower);
        }
    }

    /// [`update`](Self::update) from the configured columns of a row
    pub fn observe_row(&mut self, row: &Row, options: &ScrubOptions) {
        let value = |col: u16| row.cell(col).map(|c| &c.value);
        self.update(
            value(options.description_column),
            value(options.upper_column),
            value(options.lower_column),
        );
    }

    /// The window to apply to the current row, once both bounds are known
    pub fn resolved(&self) -> Option<ResolvedWindow> {
        Some(ResolvedWindow {
            lower: self.lower?,
            upper: self.upper?,
            is_angular: self.is_angular,
        })
    }
}

/// A complete window for one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWindow {
    pub lower: f64,
    pub upper: f64,
    pub is_angular: bool,
}

impl ResolvedWindow {
    pub fn new(lower: f64, upper: f64, is_angular: bool) -> Self {
        Self {
            lower,
            upper,
            is_angular,
        }
    }

    /// Whether a value lies inside the window, bounds included
    pub fn contains(&self, value: f64) -> bool {
        !(value > self.upper || value < self.lower)
    }

    /// Rounding unit for regenerated values
    pub fn precision(&self) -> Precision {
        Precision::for_row(self.is_angular)
    }
}

/// A description is angular when it starts with "ang" or holds a degree glyph
pub fn is_angular_description(description: Option<&Primitive<'_>>) -> bool {
    let Some(description) = description else {
        return false;
    };
    let folded = description.to_text().trim().to_lowercase();
    folded.starts_with("ang") || folded.contains('°')
}
