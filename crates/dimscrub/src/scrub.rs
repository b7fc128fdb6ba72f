//! Workbook-level orchestration
//!
//! Walks every sheet top to bottom, feeds each populated row to the
//! [`ToleranceWindow`] and rewrites the configured target cells of every row
//! whose window is complete.
//!
//! # Example
//!
//! ```rust
//! use dimscrub::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut workbook = Workbook::new();
//! let idx = workbook.add_worksheet_with_name("Report");
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//! sheet.set_cell_value("B5", "Bore diameter").unwrap();
//! sheet.set_cell_value("C5", 15.0).unwrap();
//! sheet.set_cell_value("D5", 10.0).unwrap();
//! sheet.set_cell_value("E5", 12.5).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let stats = workbook.scrub_with_rng(&ScrubOptions::default(), &mut rng).unwrap();
//! assert_eq!(stats.processed_cells, 1);
//! assert_eq!(stats.in_spec_count, 1);
//! ```

use rand::Rng;

use dimscrub_core::{CellAddress, Row, Workbook, Worksheet};

use crate::error::{Result, ScrubError};
use crate::options::ScrubOptions;
use crate::rewrite::rewrite_cell;
use crate::stats::ProcessingStats;
use crate::tolerance::ToleranceWindow;

/// Rewrite every target cell of `workbook` in place
///
/// Fails with [`ScrubError::NoData`] when no sheet holds a populated row;
/// the workbook is left untouched in that case.
pub fn scrub_workbook<R: Rng + ?Sized>(
    workbook: &mut Workbook,
    options: &ScrubOptions,
    rng: &mut R,
) -> Result<ProcessingStats> {
    if !workbook.has_data() {
        return Err(ScrubError::NoData);
    }

    let mut engine = ScrubEngine::new(options, rng);
    for sheet in workbook.worksheets_mut() {
        engine.scrub_sheet(sheet);
    }

    let stats = engine.stats;
    tracing::info!(
        sheets = stats.sheets_processed,
        rows = stats.total_rows,
        cells = stats.processed_cells,
        in_spec = stats.in_spec_count,
        out_of_spec = stats.out_of_spec_count,
        "scrub finished"
    );
    Ok(stats)
}

/// Extension trait for Workbook to add scrub methods
pub trait WorkbookScrubExt {
    /// Scrub with the thread-local generator
    fn scrub(&mut self, options: &ScrubOptions) -> Result<ProcessingStats>;

    /// Scrub with a caller-supplied generator
    fn scrub_with_rng<R: Rng + ?Sized>(
        &mut self,
        options: &ScrubOptions,
        rng: &mut R,
    ) -> Result<ProcessingStats>;
}

impl WorkbookScrubExt for Workbook {
    fn scrub(&mut self, options: &ScrubOptions) -> Result<ProcessingStats> {
        scrub_workbook(self, options, &mut rand::thread_rng())
    }

    fn scrub_with_rng<R: Rng + ?Sized>(
        &mut self,
        options: &ScrubOptions,
        rng: &mut R,
    ) -> Result<ProcessingStats> {
        scrub_workbook(self, options, rng)
    }
}

/// State of one run
struct ScrubEngine<'a, R: ?Sized> {
    options: &'a ScrubOptions,
    rng: &'a mut R,
    window: ToleranceWindow,
    stats: ProcessingStats,
}

impl<'a, R: Rng + ?Sized> ScrubEngine<'a, R> {
    fn new(options: &'a ScrubOptions, rng: &'a mut R) -> Self {
        Self {
            options,
            rng,
            window: ToleranceWindow::new(),
            stats: ProcessingStats::default(),
        }
    }

    fn scrub_sheet(&mut self, sheet: &mut Worksheet) {
        if !sheet.has_data() {
            tracing::debug!(sheet = sheet.name(), "skipping sheet without data");
            return;
        }

        let _span = tracing::debug_span!("scrub_sheet", sheet = sheet.name()).entered();
        self.stats.sheets_processed += 1;
        if self.options.reset_window_per_sheet {
            self.window.reset();
        }

        let before = self.stats;
        for row in sheet.rows_mut() {
            if row.is_empty() {
                continue;
            }
            self.scrub_row(row);
        }

        tracing::debug!(
            rows = self.stats.total_rows - before.total_rows,
            cells = self.stats.processed_cells - before.processed_cells,
            "sheet done"
        );
    }

    fn scrub_row(&mut self, row: &mut Row) {
        self.stats.total_rows += 1;
        self.window.observe_row(row, self.options);

        let Some(window) = self.window.resolved() else {
            tracing::trace!(row = row.index + 1, "no tolerance window yet");
            return;
        };

        for &col in &self.options.target_columns {
            let addr = CellAddress::new(row.index, col);
            if let Some(cell) = row.cell_mut(col) {
                rewrite_cell(cell, addr, &window, &mut *self.rng, &mut self.stats);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimscrub_core::{CellRange, CellValue};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn report() -> Workbook {
        let mut workbook = Workbook::new();
        let idx = workbook.add_worksheet_with_name("Report");
        let sheet = workbook.worksheet_mut(idx).unwrap();

        sheet.set_cell_value("A1", "Inspection report").unwrap();
        sheet.set_cell_value("B3", "Bore diameter").unwrap();
        sheet.set_cell_value("C3", 15.0).unwrap();
        sheet.set_cell_value("D3", 10.0).unwrap();
        sheet.set_cell_value("E3", 12.5).unwrap();
        sheet.set_cell_value("F3", 16.0).unwrap();
        sheet.set_cell_value("G3", "OK").unwrap();
        // bounds merged down over rows 3..=5
        sheet.merge_cells(&CellRange::parse("C3:C5").unwrap()).unwrap();
        sheet.merge_cells(&CellRange::parse("D3:D5").unwrap()).unwrap();
        sheet.set_cell_value("E4", "10.5 / 10.8").unwrap();
        sheet.set_cell_value("E5", "9,00").unwrap();
        sheet.set_cell_value("B6", "Angle of chamfer").unwrap();
        sheet.set_cell_value("C6", "32°00'").unwrap();
        sheet.set_cell_value("D6", "30 00").unwrap();
        sheet.set_cell_value("E6", "31°10'").unwrap();
        workbook
    }

    #[test]
    fn test_scrub_report() {
        let mut workbook = report();
        let mut rng = StdRng::seed_from_u64(11);
        let stats = scrub_workbook(&mut workbook, &ScrubOptions::default(), &mut rng).unwrap();

        assert_eq!(
            stats,
            ProcessingStats {
                total_rows: 5,
                processed_cells: 5,
                in_spec_count: 4,
                out_of_spec_count: 2,
                sheets_processed: 1,
            }
        );

        let sheet = workbook.worksheet(0).unwrap();
        let value = |a: &str| sheet.get_value(a).unwrap();
        assert!((10.0..=15.0).contains(&value("E3").as_number().unwrap()));
        assert!(value("F3").as_number().unwrap() > 15.0);
        assert_eq!(value("G3"), CellValue::string("OK"));
        assert!(value("E5").as_number().unwrap() < 10.0);
        let angle = crate::angle::decode_str(value("E6").as_string().unwrap()).unwrap();
        assert!((30.0..=32.0).contains(&angle));

        // bound and description cells are never rewritten
        assert_eq!(value("C3"), CellValue::Number(15.0));
        assert_eq!(value("B6"), CellValue::string("Angle of chamfer"));
        assert_eq!(sheet.modified_cells().count(), 5);
    }

    #[test]
    fn test_rows_before_first_window_are_counted_not_rewritten() {
        let mut workbook = report();
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("E1", 99.0).unwrap();

        let mut rng = StdRng::seed_from_u64(12);
        let stats = workbook.scrub_with_rng(&ScrubOptions::default(), &mut rng).unwrap();

        assert_eq!(stats.total_rows, 5);
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.get_value("E1").unwrap(), CellValue::Number(99.0));
    }

    #[test]
    fn test_no_data() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet_with_name("Empty");
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            scrub_workbook(&mut workbook, &ScrubOptions::default(), &mut rng),
            Err(ScrubError::NoData)
        ));
        assert!(matches!(
            Workbook::new().scrub(&ScrubOptions::default()),
            Err(ScrubError::NoData)
        ));
    }

    #[test]
    fn test_window_reset_per_sheet() {
        let mut workbook = report();
        let idx = workbook.add_worksheet_with_name("Second");
        let sheet = workbook.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("B2", "Length").unwrap();
        sheet.set_cell_value("E2", 12.0).unwrap();

        let mut rng = StdRng::seed_from_u64(13);
        let stats = scrub_workbook(&mut workbook, &ScrubOptions::default(), &mut rng).unwrap();
        assert_eq!(stats.sheets_processed, 2);
        assert_eq!(stats.processed_cells, 5);
        assert_eq!(
            workbook.worksheet(1).unwrap().get_value("E2").unwrap(),
            CellValue::Number(12.0)
        );

        let mut workbook = report();
        let idx = workbook.add_worksheet_with_name("Second");
        let sheet = workbook.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("B2", "Length").unwrap();
        sheet.set_cell_value("E2", 12.0).unwrap();

        // sheet one's 30..32 window still applies: 12.0 is now out of spec
        let options = ScrubOptions::default().with_reset_window_per_sheet(false);
        let stats = scrub_workbook(&mut workbook, &options, &mut rng).unwrap();
        assert_eq!(stats.processed_cells, 6);
        let carried = workbook.worksheet(1).unwrap().get_value("E2").unwrap();
        assert!(carried.as_number().unwrap() < 30.0);
        assert_eq!(stats.out_of_spec_count, 3);
    }

    #[test]
    fn test_custom_target_columns() {
        let mut workbook = report();
        let options = ScrubOptions::default().with_target_columns([6]);
        let mut rng = StdRng::seed_from_u64(14);

        let stats = scrub_workbook(&mut workbook, &options, &mut rng).unwrap();
        // G3 holds "OK" and nothing else is populated in column G
        assert_eq!(stats.processed_cells, 0);
        assert_eq!(stats.total_rows, 5);
    }
}
