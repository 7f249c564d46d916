use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Size of one index record: 8 bytes of data offset followed by 4 bytes of data size.
pub const INDEX_RECORD_SIZE: u64 = 12;

/// Integer tile coordinates inside a zoom level.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column, growing to the east.
    pub x: i32,
    /// Row, growing to the south.
    pub y: i32,
}

impl TileCoord {
    /// Creates a tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle of tile coordinates. Both corners are inclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TileRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRect {
    /// Creates a rectangle, returns `None` if the corners are swapped.
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        if max_x < min_x || max_y < min_y {
            return None;
        }

        Some(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Number of tile columns.
    pub fn width(&self) -> i64 {
        self.max_x as i64 - self.min_x as i64 + 1
    }

    /// Number of tile rows.
    pub fn height(&self) -> i64 {
        self.max_y as i64 - self.min_y as i64 + 1
    }

    /// Tile lies inside the rectangle, edges included.
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.min_x <= tile.x && self.max_x >= tile.x && self.min_y <= tile.y && self.max_y >= tile.y
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl Display for TileRect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}; {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Rectangular block of tiles of one zoom level with its own contiguous index table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Region {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    /// Index of the tile source the region was produced from. Not used for lookup.
    pub source: i32,
    /// Absolute file offset of the first index record of the region.
    pub offset: u64,
}

impl Region {
    /// Tile rectangle covered by the region. `None` for a region with swapped corners.
    pub fn rect(&self) -> Option<TileRect> {
        TileRect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Tile lies inside the region. Always false for a region with swapped corners.
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.rect().is_some_and(|rect| rect.contains(tile))
    }

    /// Position of the tile in the region's index table.
    ///
    /// Tiles are stored column by column: `x * height + y`, with `x` and `y` relative to the
    /// region's minimum corner.
    pub fn serial(&self, tile: TileCoord) -> Option<u64> {
        let rect = self.rect()?;
        if !rect.contains(tile) {
            return None;
        }

        let x = (tile.x as i64 - self.min_x as i64) as u64;
        let y = (tile.y as i64 - self.min_y as i64) as u64;
        Some(x * rect.height() as u64 + y)
    }

    /// Absolute file offset of the tile's index record.
    pub fn record_offset(&self, tile: TileCoord) -> Option<u64> {
        self.serial(tile)?
            .checked_mul(INDEX_RECORD_SIZE)?
            .checked_add(self.offset)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.rect() {
            Some(rect) => write!(f, "Region({rect}, {})", self.offset),
            None => write!(f, "Region(<invalid>, {})", self.offset),
        }
    }
}

/// All regions of a single zoom level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zoom {
    /// Zoom level, 0 is the whole world in one tile.
    pub level: i32,
    /// Regions in file order.
    pub regions: Vec<Region>,
}

impl Zoom {
    /// Creates a zoom level without regions.
    pub fn new(level: i32) -> Self {
        Self {
            level,
            regions: vec![],
        }
    }

    /// First region in table order containing the tile.
    ///
    /// Regions are not supposed to overlap. If they do, the one stored first in the file wins.
    pub fn find_region(&self, tile: TileCoord) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(tile))
    }

    /// Union of the rectangles of all regions of the level.
    pub fn rect(&self) -> Option<TileRect> {
        self.regions
            .iter()
            .filter_map(Region::rect)
            .reduce(|acc, rect| acc.merge(rect))
    }
}

impl PartialEq for Zoom {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level
    }
}

impl Eq for Zoom {}

impl PartialOrd for Zoom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Zoom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level.cmp(&other.level)
    }
}

impl Display for Zoom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zoom({}, [", self.level)?;
        for (i, region) in self.regions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{region}")?;
        }
        write!(f, "])")
    }
}

/// Location of the raw image bytes of one tile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileAddress {
    /// Absolute offset of the image data.
    pub offset: u64,
    /// Size of the image data in bytes.
    pub size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(min_x: i32, max_x: i32, min_y: i32, max_y: i32, offset: u64) -> Region {
        Region {
            min_x,
            max_x,
            min_y,
            max_y,
            source: 0,
            offset,
        }
    }

    #[test]
    fn serial_is_column_major() {
        let r = region(0, 1, 0, 1, 1000);
        assert_eq!(r.serial(TileCoord::new(0, 0)), Some(0));
        assert_eq!(r.serial(TileCoord::new(0, 1)), Some(1));
        assert_eq!(r.serial(TileCoord::new(1, 0)), Some(2));
        assert_eq!(r.serial(TileCoord::new(1, 1)), Some(3));

        assert_eq!(r.record_offset(TileCoord::new(0, 0)), Some(1000));
        assert_eq!(r.record_offset(TileCoord::new(0, 1)), Some(1012));
        assert_eq!(r.record_offset(TileCoord::new(1, 0)), Some(1024));
        assert_eq!(r.record_offset(TileCoord::new(1, 1)), Some(1036));
    }

    #[test]
    fn serial_is_relative_to_region_corner() {
        let r = region(10, 12, 20, 23, 0);
        assert_eq!(r.serial(TileCoord::new(10, 20)), Some(0));
        assert_eq!(r.serial(TileCoord::new(10, 23)), Some(3));
        assert_eq!(r.serial(TileCoord::new(11, 20)), Some(4));
        assert_eq!(r.serial(TileCoord::new(12, 23)), Some(11));
    }

    #[test]
    fn serial_outside_of_region() {
        let r = region(10, 12, 20, 23, 0);
        assert_eq!(r.serial(TileCoord::new(9, 20)), None);
        assert_eq!(r.serial(TileCoord::new(13, 20)), None);
        assert_eq!(r.serial(TileCoord::new(10, 19)), None);
        assert_eq!(r.serial(TileCoord::new(10, 24)), None);
    }

    #[test]
    fn invalid_region_contains_nothing() {
        let r = region(5, 4, 0, 0, 0);
        assert!(r.rect().is_none());
        assert!(!r.contains(TileCoord::new(4, 0)));
        assert!(!r.contains(TileCoord::new(5, 0)));
    }

    #[test]
    fn first_matching_region_wins() {
        let mut zoom = Zoom::new(3);
        zoom.regions.push(region(0, 3, 0, 3, 100));
        zoom.regions.push(region(2, 5, 2, 5, 200));

        assert_eq!(zoom.find_region(TileCoord::new(2, 2)).map(|r| r.offset), Some(100));
        assert_eq!(zoom.find_region(TileCoord::new(5, 5)).map(|r| r.offset), Some(200));
        assert!(zoom.find_region(TileCoord::new(6, 0)).is_none());
    }

    #[test]
    fn zoom_rect_is_union_of_regions() {
        let mut zoom = Zoom::new(1);
        assert_eq!(zoom.rect(), None);

        zoom.regions.push(region(0, 0, 1, 1, 0));
        zoom.regions.push(region(1, 1, 0, 0, 0));
        zoom.regions.push(region(9, 0, 9, 0, 0));

        assert_eq!(zoom.rect(), TileRect::new(0, 0, 1, 1));
    }

    #[test]
    fn zooms_are_ordered_by_level() {
        let mut zooms = vec![Zoom::new(5), Zoom::new(1), Zoom::new(3)];
        zooms.sort();
        let levels: Vec<i32> = zooms.iter().map(|z| z.level).collect();
        assert_eq!(levels, [1, 3, 5]);
    }

    #[test]
    fn display() {
        let mut zoom = Zoom::new(2);
        zoom.regions.push(region(0, 1, 2, 3, 44));
        assert_eq!(zoom.to_string(), "Zoom(2, [Region([0, 2; 1, 3], 44)])");
    }
}
