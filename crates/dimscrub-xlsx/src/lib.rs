//! # dimscrub-xlsx
//!
//! XLSX (Office Open XML) reader and writer for dimscrub.
//!
//! Reading produces an [`XlsxDocument`]: the grid as a
//! [`dimscrub_core::Workbook`] plus the untouched zip parts it came from.
//! Writing patches only the cells marked modified back into those parts, so
//! everything the grid does not model (drawings, print setup, conditional
//! formats, ...) survives unchanged.

pub mod document;
pub mod error;
pub mod package;
pub mod reader;
pub mod writer;

mod rels;
mod styles;
mod xml;

pub use document::XlsxDocument;
pub use error::{XlsxError, XlsxResult};
pub use package::XlsxPackage;
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
