//! Bytes-in, bytes-out entry points

use rand::Rng;

use dimscrub_xlsx::{XlsxReader, XlsxWriter};

use crate::error::Result;
use crate::options::ScrubOptions;
use crate::scrub::scrub_workbook;
use crate::stats::ProcessingStats;

/// Rewrite a workbook container with the thread-local generator
///
/// Returns the rewritten container and the run statistics. Nothing is
/// produced when the workbook has no data.
pub fn process(bytes: &[u8], options: &ScrubOptions) -> Result<(Vec<u8>, ProcessingStats)> {
    process_with_rng(bytes, options, &mut rand::thread_rng())
}

/// [`process`] with a caller-supplied generator
pub fn process_with_rng<R: Rng + ?Sized>(
    bytes: &[u8],
    options: &ScrubOptions,
    rng: &mut R,
) -> Result<(Vec<u8>, ProcessingStats)> {
    let mut document = XlsxReader::read(bytes)?;
    tracing::debug!(
        sheets = document.workbook().sheet_count(),
        "read workbook"
    );

    let stats = scrub_workbook(document.workbook_mut(), options, rng)?;
    let output = XlsxWriter::write(&document)?;
    Ok((output, stats))
}
