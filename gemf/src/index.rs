use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::GemfError;
use crate::region::{Region, TileAddress, TileCoord, Zoom};

/// Format versions this reader understands.
pub const SUPPORTED_VERSIONS: [i32; 2] = [3, 4];

/// Entry of the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Index referenced by [`Region::source`].
    pub index: i32,
    /// Name or URL of the source, as stored by the producing tool.
    pub name: String,
}

/// Parsed header, source table and region table of a GEMF file.
///
/// Zoom levels are sorted ascending once all regions are read. Tile data itself stays on disk and
/// is located with [`GemfIndex::resolve_tile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GemfIndex {
    version: i32,
    tile_size: u32,
    sources: Vec<Source>,
    zooms: Vec<Zoom>,
}

impl GemfIndex {
    /// Reads the index from a stream positioned at the start of the file.
    pub fn read(reader: &mut impl Read) -> Result<Self, GemfError> {
        let (version, tile_size) = read_header(reader)?;
        let sources = read_sources(reader)?;
        let mut zooms = read_regions(reader)?;
        zooms.sort();

        log::debug!(
            "Read GEMF v{version} index: tile size {tile_size}, {} sources, {} zoom levels",
            sources.len(),
            zooms.len()
        );

        Ok(Self {
            version,
            tile_size,
            sources,
            zooms,
        })
    }

    /// Format version from the header.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Edge of a tile in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tile sources in file order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Zoom levels sorted ascending by level.
    pub fn zooms(&self) -> &[Zoom] {
        &self.zooms
    }

    /// Reads the index record of the tile at the given zoom index.
    pub fn resolve_tile<R: Read + Seek>(
        &self,
        reader: &mut R,
        zoom_index: usize,
        tile: TileCoord,
    ) -> Result<TileAddress, GemfError> {
        let zoom = self
            .zooms
            .get(zoom_index)
            .ok_or(GemfError::InvalidZoom(zoom_index))?;
        let region = zoom.find_region(tile).ok_or(GemfError::TileNotFound)?;

        read_index_record(reader, region, tile)
    }

    /// Reads raw image bytes of the tile at the given zoom index.
    pub fn tile_data<R: Read + Seek>(
        &self,
        reader: &mut R,
        zoom_index: usize,
        tile: TileCoord,
    ) -> Result<Bytes, GemfError> {
        let address = self.resolve_tile(reader, zoom_index, tile)?;
        read_tile_data(reader, address)
    }
}

/// Checks whether the stream starts with a supported GEMF header.
///
/// Only the version field is inspected, the stream position is advanced by 4 bytes.
pub fn sniff(reader: &mut impl Read) -> bool {
    match reader.read_i32::<BigEndian>() {
        Ok(version) => SUPPORTED_VERSIONS.contains(&version),
        Err(_) => false,
    }
}

fn read_header(reader: &mut impl Read) -> Result<(i32, u32), GemfError> {
    let version = reader
        .read_i32::<BigEndian>()
        .map_err(|_| GemfError::InvalidHeader)?;
    let tile_size = reader
        .read_i32::<BigEndian>()
        .map_err(|_| GemfError::InvalidHeader)?;

    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(GemfError::InvalidHeader);
    }

    let tile_size = u32::try_from(tile_size)
        .ok()
        .filter(|size| *size > 0)
        .ok_or(GemfError::InvalidHeader)?;

    Ok((version, tile_size))
}

fn read_sources(reader: &mut impl Read) -> Result<Vec<Source>, GemfError> {
    let count = read_count(reader).ok_or(GemfError::Sources)?;

    let mut sources = Vec::new();
    for _ in 0..count {
        let index = reader
            .read_i32::<BigEndian>()
            .map_err(|_| GemfError::Sources)?;
        let len = read_count(reader).ok_or(GemfError::Sources)?;

        let mut name = Vec::new();
        reader
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut name)
            .map_err(|_| GemfError::Sources)?;
        if name.len() != len {
            return Err(GemfError::Sources);
        }

        sources.push(Source {
            index,
            name: String::from_utf8_lossy(&name).into_owned(),
        });
    }

    Ok(sources)
}

fn read_regions(reader: &mut impl Read) -> Result<Vec<Zoom>, GemfError> {
    let count = read_count(reader).ok_or(GemfError::Regions)?;

    let mut zooms: Vec<Zoom> = Vec::new();
    for _ in 0..count {
        let (level, region) = read_region(reader).map_err(|_| GemfError::Regions)?;

        match zooms.iter_mut().find(|zoom| zoom.level == level) {
            Some(zoom) => zoom.regions.push(region),
            None => {
                let mut zoom = Zoom::new(level);
                zoom.regions.push(region);
                zooms.push(zoom);
            }
        }
    }

    Ok(zooms)
}

fn read_region(reader: &mut impl Read) -> std::io::Result<(i32, Region)> {
    let level = reader.read_i32::<BigEndian>()?;
    let min_x = reader.read_i32::<BigEndian>()?;
    let max_x = reader.read_i32::<BigEndian>()?;
    let min_y = reader.read_i32::<BigEndian>()?;
    let max_y = reader.read_i32::<BigEndian>()?;
    let source = reader.read_i32::<BigEndian>()?;
    let offset = reader.read_u64::<BigEndian>()?;

    Ok((
        level,
        Region {
            min_x,
            max_x,
            min_y,
            max_y,
            source,
            offset,
        },
    ))
}

/// Reads a non-negative 32 bit count. Negative values are treated as corruption.
fn read_count(reader: &mut impl Read) -> Option<usize> {
    let count = reader.read_i32::<BigEndian>().ok()?;
    usize::try_from(count).ok()
}

/// Reads the index record of `tile` from the index table of `region`.
pub fn read_index_record<R: Read + Seek>(
    reader: &mut R,
    region: &Region,
    tile: TileCoord,
) -> Result<TileAddress, GemfError> {
    let record_offset = region
        .record_offset(tile)
        .ok_or(GemfError::TileNotFound)?;

    reader.seek(SeekFrom::Start(record_offset))?;
    let offset = reader.read_u64::<BigEndian>()?;
    let size = reader.read_u32::<BigEndian>()?;

    Ok(TileAddress { offset, size })
}

/// Reads `address.size` bytes at `address.offset`.
pub fn read_tile_data<R: Read + Seek>(
    reader: &mut R,
    address: TileAddress,
) -> Result<Bytes, GemfError> {
    reader.seek(SeekFrom::Start(address.offset))?;

    let mut data = Vec::new();
    reader.by_ref().take(address.size as u64).read_to_end(&mut data)?;
    if data.len() != address.size as usize {
        return Err(GemfError::TileNotFound);
    }

    Ok(data.into())
}
