//! Stored cell data

use super::{CellAddress, CellRange, CellValue};
use crate::number_format::NumberFormat;

/// How a cell takes part in a merged region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeRole {
    /// Not merged
    #[default]
    None,
    /// Top-left cell of a merged region; owns the displayed value
    Master(CellRange),
    /// Any other cell of a merged region
    Follower {
        /// Address of the region's master cell
        master: CellAddress,
    },
}

impl MergeRole {
    /// Role of `addr` inside `range`
    pub fn within(range: &CellRange, addr: CellAddress) -> Self {
        if !range.contains(&addr) {
            MergeRole::None
        } else if addr == range.start {
            MergeRole::Master(*range)
        } else {
            MergeRole::Follower {
                master: range.start,
            }
        }
    }

    /// Check if this is a follower cell
    pub fn is_follower(&self) -> bool {
        matches!(self, MergeRole::Follower { .. })
    }
}

/// Complete data for a single cell
#[derive(Debug, Clone, Default)]
pub struct Cell {
    /// The cell's value
    pub value: CellValue,
    /// Container style index (0 = default style)
    pub style_index: u32,
    /// Display format override applied when the cell is written back
    pub number_format: Option<NumberFormat>,
    /// Merged region membership
    pub merge: MergeRole,
    modified: bool,
}

impl Cell {
    /// Create a new cell with a value and default style
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style<V: Into<CellValue>>(value: V, style_index: u32) -> Self {
        Self {
            value: value.into(),
            style_index,
            ..Self::default()
        }
    }

    /// Check if this cell holds no value
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Check if this cell is a merge follower
    pub fn is_merge_follower(&self) -> bool {
        self.merge.is_follower()
    }

    /// Replace the cell's value and mark it modified
    pub fn set_value<V: Into<CellValue>>(&mut self, value: V) {
        self.value = value.into();
        self.modified = true;
    }

    /// Set the display format override and mark the cell modified
    pub fn set_number_format(&mut self, format: NumberFormat) {
        self.number_format = Some(format);
        self.modified = true;
    }

    /// Whether the cell was changed since it was loaded
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_role_within() {
        let range = CellRange::parse("C2:C4").unwrap();
        assert_eq!(
            MergeRole::within(&range, CellAddress::new(1, 2)),
            MergeRole::Master(range)
        );
        assert!(MergeRole::within(&range, CellAddress::new(3, 2)).is_follower());
        assert_eq!(
            MergeRole::within(&range, CellAddress::new(3, 3)),
            MergeRole::None
        );
    }

    #[test]
    fn test_set_value_marks_modified() {
        let mut cell = Cell::with_style(12.5, 3);
        assert!(!cell.is_modified());

        cell.set_value(13.1);
        assert!(cell.is_modified());
        assert_eq!(cell.value, CellValue::Number(13.1));
        assert_eq!(cell.style_index, 3);
    }
}
