//! Reader of GEMF tile containers.
//!
//! A GEMF file starts with a header (version and tile size), followed by a table of tile sources
//! and a table of regions. Each region is a rectangle of tiles of one zoom level that points to
//! a contiguous table of 12 byte index records. An index record holds the offset and the size of
//! the raw image of one tile.
//!
//! ```text
//! Header:       i32 version (3 or 4), i32 tile_size
//! Sources:      i32 count; { i32 index, i32 name_len, [u8; name_len] name }
//! Regions:      i32 count; { i32 level, i32 min_x, i32 max_x, i32 min_y, i32 max_y,
//!                            i32 source, u64 offset }
//! IndexRecord:  at region.offset + 12 * serial: { u64 data_offset, u32 data_size }
//! ```
//!
//! All numbers are big-endian.

mod error;
mod index;
mod region;

#[cfg(any(test, feature = "_tests"))]
pub mod test_utils;

pub use error::GemfError;
pub use index::{read_index_record, read_tile_data, sniff, GemfIndex, Source, SUPPORTED_VERSIONS};
pub use region::{Region, TileAddress, TileCoord, TileRect, Zoom, INDEX_RECORD_SIZE};
