//! Run statistics

use std::fmt;

/// Counters accumulated over one scrub run
///
/// Token counts can exceed `processed_cells`: a composite cell holding two
/// values counts once in `processed_cells` and twice in the verdict counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProcessingStats {
    /// Number of populated rows visited
    pub total_rows: usize,
    /// Number of cells rewritten
    pub processed_cells: usize,
    /// Number of values that were inside their tolerance window
    pub in_spec_count: usize,
    /// Number of values that were outside their tolerance window
    pub out_of_spec_count: usize,
    /// Number of sheets with at least one populated row
    pub sheets_processed: usize,
}

impl ProcessingStats {
    pub(crate) fn record(&mut self, in_spec: bool) {
        if in_spec {
            self.in_spec_count += 1;
        } else {
            self.out_of_spec_count += 1;
        }
    }
}

impl fmt::Display for ProcessingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in {} sheets, {} cells rewritten ({} in spec, {} out of spec)",
            self.total_rows,
            self.sheets_processed,
            self.processed_cells,
            self.in_spec_count,
            self.out_of_spec_count
        )
    }
}
