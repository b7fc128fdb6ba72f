//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The raw value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangular range of cells (e.g., "A1:B10")
//! - [`Cell`] - A stored cell: value, style, merge role and edit state

mod address;
mod data;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use data::{Cell, MergeRole};
pub use value::{CellError, CellValue, SharedString, StructuredValue, TextRun};
