//! Error types used by the crate.

use gemf::GemfError;
use image::ImageError;
use thiserror::Error;

/// Map error type.
#[derive(Debug, Error)]
pub enum MapError {
    /// The file is not a valid GEMF container.
    #[error("{0}")]
    Format(#[from] GemfError),
    /// The map has no usable area: no zoom levels or an empty region rectangle.
    #[error("Invalid map area: {0}")]
    Bounds(String),
    /// Tile is not present in the map.
    #[error("tile not found")]
    NotFound,
    /// The file format is not recognized by any of the map backends.
    #[error("unknown map format")]
    UnknownFormat,
    /// Image decoding error.
    #[error("image decode error: {0:?}")]
    ImageDecode(#[from] ImageError),
    /// Decode thread pool could not be created.
    #[error("failed to create decode pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Error reading data from the FS.
    #[error("{0}")]
    FsIo(#[from] std::io::Error),
}
