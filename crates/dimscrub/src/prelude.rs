//! Prelude module - common imports for dimscrub users
//!
//! ```rust
//! use dimscrub::prelude::*;
//! ```

pub use crate::{
    // Entry points
    process,
    process_with_rng,
    scrub_workbook,
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    // Configuration and results
    ProcessingStats,
    ScrubError,
    ScrubOptions,
    // Main types
    Workbook,
    // Extension traits
    WorkbookScrubExt,
    Worksheet,
    // I/O types
    XlsxDocument,
    XlsxReader,
    XlsxWriter,
};
