//! # dimscrub
//!
//! Rewrites the measured values of dimensional-inspection reports so that no
//! original digits survive while every value keeps its pass/fail verdict
//! against the row's tolerance window.
//!
//! ## Layout of a report
//!
//! - column B describes the feature; rows whose description starts with
//!   "ang" or holds a `°` are angular (degree-minute notation)
//! - columns C and D hold the upper and lower tolerance, often merged down
//!   over several measurement rows
//! - columns E, F and G hold the measurements
//!
//! All of these are configurable through [`ScrubOptions`].
//!
//! ## Example
//!
//! ```rust
//! use dimscrub::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let idx = workbook.add_worksheet_with_name("Report");
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//! sheet.set_cell_value("B2", "Bore diameter").unwrap();
//! sheet.set_cell_value("C2", 15.0).unwrap();
//! sheet.set_cell_value("D2", 10.0).unwrap();
//! sheet.set_cell_value("E2", 16.0).unwrap();
//!
//! let stats = workbook.scrub(&ScrubOptions::default()).unwrap();
//! assert_eq!(stats.out_of_spec_count, 1);
//!
//! let sheet = workbook.worksheet(0).unwrap();
//! assert!(sheet.get_value("E2").unwrap().as_number().unwrap() > 15.0);
//! ```

pub mod angle;
pub mod error;
pub mod normalize;
pub mod number;
pub mod options;
pub mod prelude;
pub mod process;
pub mod randomize;
pub mod rewrite;
pub mod scrub;
pub mod stats;
pub mod tolerance;

pub use error::{Result, ScrubError};
pub use options::ScrubOptions;
pub use process::{process, process_with_rng};
pub use scrub::{scrub_workbook, WorkbookScrubExt};
pub use stats::ProcessingStats;
pub use tolerance::{ResolvedWindow, ToleranceWindow};

// Re-export core types
pub use dimscrub_core::{
    Cell, CellAddress, CellRange, CellValue, MergeRole, NumberFormat, Row, StructuredValue,
    Workbook, Worksheet, MAX_COLS, MAX_ROWS,
};

// Re-export I/O types
pub use dimscrub_xlsx::{XlsxDocument, XlsxError, XlsxReader, XlsxWriter};
