//! Row types

use std::collections::BTreeMap;

use crate::cell::Cell;

/// A worksheet row: its cells keyed by 0-based column
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Row index (0-based)
    pub index: u32,
    cells: BTreeMap<u16, Cell>,
}

impl Row {
    /// Create a new empty row
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    /// Get a cell by column index
    pub fn cell(&self, col: u16) -> Option<&Cell> {
        self.cells.get(&col)
    }

    /// Get a mutable cell by column index
    pub fn cell_mut(&mut self, col: u16) -> Option<&mut Cell> {
        self.cells.get_mut(&col)
    }

    /// Insert or replace a cell, returning the previous one
    pub fn insert(&mut self, col: u16, cell: Cell) -> Option<Cell> {
        self.cells.insert(col, cell)
    }

    /// Iterate over stored cells in column order
    pub fn cells(&self) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells.iter().map(|(col, cell)| (*col, cell))
    }

    /// Iterate over stored cells mutably in column order
    pub fn cells_mut(&mut self) -> impl Iterator<Item = (u16, &mut Cell)> {
        self.cells.iter_mut().map(|(col, cell)| (*col, cell))
    }

    /// True when no stored cell holds a value
    ///
    /// Style-only cells (common for merged followers and bordered blanks)
    /// do not make a row populated.
    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Cell::is_empty)
    }

    /// Number of stored cells, including style-only ones
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
