//! Builder of in-memory GEMF files used as test fixtures.

#![allow(missing_docs)]

use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use crate::region::{TileCoord, INDEX_RECORD_SIZE};

const REGION_ENTRY_SIZE: u64 = 32;

/// Region of a [`GemfFixture`] with the payload of every tile it covers.
pub struct RegionFixture {
    level: i32,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
    source: i32,
    payload: Box<dyn Fn(TileCoord) -> Vec<u8>>,
}

impl RegionFixture {
    /// Creates a region with empty tiles.
    pub fn new(level: i32, min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            level,
            min_x,
            max_x,
            min_y,
            max_y,
            source: 0,
            payload: Box::new(|_| vec![]),
        }
    }

    pub fn with_source(mut self, source: i32) -> Self {
        self.source = source;
        self
    }

    /// Sets the function producing raw bytes of each tile of the region.
    pub fn with_payload(mut self, payload: impl Fn(TileCoord) -> Vec<u8> + 'static) -> Self {
        self.payload = Box::new(payload);
        self
    }

    /// Tiles of the region in index table order.
    fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_x..=self.max_x)
            .flat_map(move |x| (self.min_y..=self.max_y).map(move |y| TileCoord::new(x, y)))
    }

    fn tile_count(&self) -> u64 {
        self.tiles().count() as u64
    }
}

/// GEMF file builder.
pub struct GemfFixture {
    version: i32,
    tile_size: i32,
    sources: Vec<(i32, String)>,
    regions: Vec<RegionFixture>,
}

impl GemfFixture {
    pub fn new(tile_size: i32) -> Self {
        Self {
            version: 4,
            tile_size,
            sources: vec![],
            regions: vec![],
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_source(mut self, index: i32, name: &str) -> Self {
        self.sources.push((index, name.to_string()));
        self
    }

    pub fn with_region(mut self, region: RegionFixture) -> Self {
        self.regions.push(region);
        self
    }

    /// Serializes the fixture. Region index tables follow the region table in region order, tile
    /// data follows all index tables.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![];
        self.write(&mut out).expect("writing into a vector cannot fail");
        out
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn write(&self, out: &mut impl Write) -> std::io::Result<()> {
        out.write_i32::<BigEndian>(self.version)?;
        out.write_i32::<BigEndian>(self.tile_size)?;

        out.write_i32::<BigEndian>(self.sources.len() as i32)?;
        for (index, name) in &self.sources {
            out.write_i32::<BigEndian>(*index)?;
            out.write_i32::<BigEndian>(name.len() as i32)?;
            out.write_all(name.as_bytes())?;
        }

        let header_size = 8
            + 4
            + self
                .sources
                .iter()
                .map(|(_, name)| 8 + name.len() as u64)
                .sum::<u64>()
            + 4
            + REGION_ENTRY_SIZE * self.regions.len() as u64;

        out.write_i32::<BigEndian>(self.regions.len() as i32)?;
        let mut index_offset = header_size;
        for region in &self.regions {
            out.write_i32::<BigEndian>(region.level)?;
            out.write_i32::<BigEndian>(region.min_x)?;
            out.write_i32::<BigEndian>(region.max_x)?;
            out.write_i32::<BigEndian>(region.min_y)?;
            out.write_i32::<BigEndian>(region.max_y)?;
            out.write_i32::<BigEndian>(region.source)?;
            out.write_u64::<BigEndian>(index_offset)?;
            index_offset += region.tile_count() * INDEX_RECORD_SIZE;
        }

        let payloads: Vec<Vec<u8>> = self
            .regions
            .iter()
            .flat_map(|region| region.tiles().map(|tile| (region.payload)(tile)))
            .collect();

        let mut data_offset = index_offset;
        for payload in &payloads {
            out.write_u64::<BigEndian>(data_offset)?;
            out.write_u32::<BigEndian>(payload.len() as u32)?;
            data_offset += payload.len() as u64;
        }

        for payload in &payloads {
            out.write_all(payload)?;
        }

        Ok(())
    }
}
