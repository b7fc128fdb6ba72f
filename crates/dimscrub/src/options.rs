//! Run configuration

use dimscrub_core::{CellAddress, MAX_COLS};

use crate::error::{Result, ScrubError};

/// Options for a scrub run
///
/// Column indices are 0-based (A = 0). The defaults match the usual report
/// layout: description in B, upper and lower tolerance in C and D, measured
/// values in E through G.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubOptions {
    /// Column whose text decides whether a row is angular (default: B)
    pub description_column: u16,
    /// Upper tolerance bound column (default: C)
    pub upper_column: u16,
    /// Lower tolerance bound column (default: D)
    pub lower_column: u16,
    /// Columns holding measured values to rewrite (default: E, F, G)
    pub target_columns: Vec<u16>,
    /// Forget latched bounds when moving to the next sheet (default: true)
    pub reset_window_per_sheet: bool,
}

impl Default for ScrubOptions {
    fn default() -> Self {
        Self {
            description_column: 1,
            upper_column: 2,
            lower_column: 3,
            target_columns: vec![4, 5, 6],
            reset_window_per_sheet: true,
        }
    }
}

impl ScrubOptions {
    /// Create options with the default layout
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description_column(mut self, col: u16) -> Self {
        self.description_column = col;
        self
    }

    pub fn with_upper_column(mut self, col: u16) -> Self {
        self.upper_column = col;
        self
    }

    pub fn with_lower_column(mut self, col: u16) -> Self {
        self.lower_column = col;
        self
    }

    /// Set the measured-value columns; duplicates are dropped keeping first-seen order
    pub fn with_target_columns<I: IntoIterator<Item = u16>>(mut self, cols: I) -> Self {
        self.target_columns.clear();
        for col in cols {
            if !self.target_columns.contains(&col) {
                self.target_columns.push(col);
            }
        }
        self
    }

    pub fn with_reset_window_per_sheet(mut self, reset: bool) -> Self {
        self.reset_window_per_sheet = reset;
        self
    }

    /// Parse a comma-separated column list (`"E,F,G"` or `"5,6,7"`) into 0-based indices
    ///
    /// Letters name columns, plain numbers are 1-based positions. Duplicates
    /// are dropped keeping first-seen order.
    pub fn parse_columns(list: &str) -> Result<Vec<u16>> {
        let mut cols = Vec::new();
        for item in list.split(',').map(str::trim) {
            if item.is_empty() {
                continue;
            }
            let col = column_index(item)?;
            if !cols.contains(&col) {
                cols.push(col);
            }
        }

        if cols.is_empty() {
            return Err(ScrubError::InvalidColumns(format!(
                "'{}' names no columns",
                list
            )));
        }
        Ok(cols)
    }

    /// Parse a single column (`"B"` or `"2"`) into a 0-based index
    pub fn parse_column(item: &str) -> Result<u16> {
        column_index(item.trim())
    }
}

fn column_index(item: &str) -> Result<u16> {
    if item.bytes().all(|b| b.is_ascii_digit()) {
        return match item.parse::<u32>() {
            Ok(n) if (1..=MAX_COLS as u32).contains(&n) => Ok((n - 1) as u16),
            _ => Err(ScrubError::InvalidColumns(format!(
                "column number '{}' is out of range",
                item
            ))),
        };
    }

    if !item.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ScrubError::InvalidColumns(format!(
            "'{}' is not a column",
            item
        )));
    }
    CellAddress::letters_to_column(&item.to_ascii_uppercase())
        .map_err(|e| ScrubError::InvalidColumns(format!("'{}': {}", item, e)))
}
