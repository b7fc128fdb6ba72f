//! A loaded workbook together with the package it came from

use dimscrub_core::Workbook;

use crate::package::XlsxPackage;

/// Workbook part every package is expected to carry
pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Grid view of an XLSX file plus everything needed to write it back
///
/// The workbook is the editable part; the package and the per-sheet part
/// names stay as they were read, so [`XlsxWriter`](crate::XlsxWriter) can
/// patch the original parts instead of regenerating them.
#[derive(Debug, Clone)]
pub struct XlsxDocument {
    workbook: Workbook,
    package: XlsxPackage,
    sheet_parts: Vec<String>,
    cell_formats: Vec<u32>,
}

impl XlsxDocument {
    pub(crate) fn new(
        workbook: Workbook,
        package: XlsxPackage,
        sheet_parts: Vec<String>,
        cell_formats: Vec<u32>,
    ) -> Self {
        Self {
            workbook,
            package,
            sheet_parts,
            cell_formats,
        }
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// The zip parts as read
    pub fn package(&self) -> &XlsxPackage {
        &self.package
    }

    /// Part name backing the worksheet at `index` (`xl/worksheets/sheet1.xml`)
    pub fn sheet_part(&self, index: usize) -> Option<&str> {
        self.sheet_parts.get(index).map(String::as_str)
    }

    /// Number format id applied by a cell style, if the style exists
    pub fn cell_format(&self, style_index: u32) -> Option<u32> {
        self.cell_formats.get(style_index as usize).copied()
    }

    /// Number of cell styles in the package's style table
    pub fn cell_format_count(&self) -> usize {
        self.cell_formats.len()
    }

    /// Give up the package and keep only the grid
    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }
}
