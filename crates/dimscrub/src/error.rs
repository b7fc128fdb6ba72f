//! Error types for a scrub run

use thiserror::Error;

/// Result type alias for dimscrub operations
pub type Result<T> = std::result::Result<T, ScrubError>;

/// Errors that end a scrub run
///
/// Cells that cannot be interpreted are not errors: they are left untouched.
#[derive(Debug, Error)]
pub enum ScrubError {
    /// No worksheet holds a single populated row
    #[error("No data found in workbook")]
    NoData,

    /// A column list could not be parsed
    #[error("Invalid column list: {0}")]
    InvalidColumns(String),

    /// The container could not be read or written
    #[error("XLSX error: {0}")]
    Xlsx(#[from] dimscrub_xlsx::XlsxError),

    /// Grid error
    #[error("Core error: {0}")]
    Core(#[from] dimscrub_core::Error),
}
