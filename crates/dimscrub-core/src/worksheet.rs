//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{Cell, CellAddress, CellRange, CellValue, MergeRole};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Rows keyed by 0-based index
    rows: BTreeMap<u32, Row>,
    /// Merged regions in container order
    merged_regions: Vec<CellRange>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
            merged_regions: Vec::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cells ===

    /// Get a cell by address string (e.g., "E5")
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Get a cell by row/column index
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.cell(col))
    }

    /// Get a mutable cell by row/column index
    pub fn cell_at_mut(&mut self, row: u32, col: u16) -> Option<&mut Cell> {
        self.rows.get_mut(&row).and_then(|r| r.cell_mut(col))
    }

    /// Get a cell value by address string
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        Ok(self
            .cell(address)?
            .map(|c| c.value.clone())
            .unwrap_or_default())
    }

    /// Store a cell as loaded from a container
    ///
    /// The cell's merge role is derived from the merged regions known so far.
    pub fn insert_cell_at(&mut self, row: u32, col: u16, mut cell: Cell) -> Result<()> {
        Self::check_bounds(row, col)?;
        cell.merge = self.merge_role_at(CellAddress::new(row, col));
        self.rows
            .entry(row)
            .or_insert_with(|| Row::new(row))
            .insert(col, cell);
        Ok(())
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row/column index, creating the cell if needed
    ///
    /// Existing cells keep their style and are marked modified.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        match self.cell_at_mut(row, col) {
            Some(cell) => {
                cell.set_value(value);
                Ok(())
            }
            None => self.insert_cell_at(row, col, Cell::new(value)),
        }
    }

    fn check_bounds(row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        Ok(())
    }

    // === Rows ===

    /// Get a row by index
    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Iterate over stored rows in order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Iterate over stored rows mutably in order
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.rows.values_mut()
    }

    /// Check whether any row holds at least one value
    pub fn has_data(&self) -> bool {
        self.rows.values().any(|r| !r.is_empty())
    }

    /// Iterate over cells changed since load, in row-major order
    pub fn modified_cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> {
        self.rows.values().flat_map(|row| {
            row.cells()
                .filter(|(_, cell)| cell.is_modified())
                .map(move |(col, cell)| (CellAddress::new(row.index, col), cell))
        })
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// Merge cells, assigning master/follower roles to stored cells
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.merged_regions.iter().any(|r| r.overlaps(range)) {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.merged_regions.push(*range);

        for (&index, row) in self.rows.range_mut(range.start.row..=range.end.row) {
            for (col, cell) in row.cells_mut() {
                let addr = CellAddress::new(index, col);
                if range.contains(&addr) {
                    cell.merge = MergeRole::within(range, addr);
                }
            }
        }
        Ok(())
    }

    /// Merge role of an address, whether or not a cell is stored there
    pub fn merge_role_at(&self, addr: CellAddress) -> MergeRole {
        self.merged_regions
            .iter()
            .find(|r| r.contains(&addr))
            .map(|r| MergeRole::within(r, addr))
            .unwrap_or_default()
    }
}
