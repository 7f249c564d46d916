//! Error type used by the crate.

use thiserror::Error;

/// Errors produced while reading a GEMF file.
#[derive(Debug, Error)]
pub enum GemfError {
    /// The header could not be read or carries a version other than 3 or 4.
    #[error("Invalid/unsupported GEMF file")]
    InvalidHeader,
    /// The source table is truncated or malformed.
    #[error("Error reading tile sources")]
    Sources,
    /// The region table is truncated or malformed.
    #[error("Error reading tile ranges")]
    Regions,
    /// Tile coordinate is not covered by any region of the zoom level, or its
    /// index record/data could not be read.
    #[error("tile not found")]
    TileNotFound,
    /// Zoom index out of range of the zoom table.
    #[error("zoom index {0} out of range")]
    InvalidZoom(usize),
    /// Underlying I/O failure.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
