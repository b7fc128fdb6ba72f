//! # dimscrub-core
//!
//! Grid data model for the dimscrub report rewriter.
//!
//! This crate provides the types the engine and the container reader share:
//! - [`CellValue`] - Raw cell values (empty, number, string, structured)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and merged regions
//! - [`Cell`], [`Row`], [`Worksheet`], [`Workbook`] - The grid itself
//!
//! ## Example
//!
//! ```rust
//! use dimscrub_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let idx = workbook.add_worksheet_with_name("Report");
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//!
//! sheet.set_cell_value("B5", "Bore diameter").unwrap();
//! sheet.set_cell_value_at(4, 4, CellValue::Number(12.5)).unwrap();
//! assert!(workbook.has_data());
//! ```

pub mod cell;
pub mod error;
pub mod number_format;
pub mod row;
pub mod workbook;
pub mod worksheet;

pub use cell::{
    Cell, CellAddress, CellError, CellRange, CellValue, MergeRole, SharedString,
    StructuredValue, TextRun,
};
pub use error::{Error, Result};
pub use number_format::NumberFormat;
pub use row::Row;
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;
