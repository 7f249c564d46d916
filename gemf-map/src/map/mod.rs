//! Tiled maps and the common interface the viewer uses to work with them.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use nalgebra::Point2;

use crate::cache::{MemoryPixelCache, PixelCache};
use crate::decode_pool::DecodePool;
use crate::error::MapError;
use crate::geometry::{Coordinates, GeoRect, Rect, Size};
use crate::options::MapOptions;
use crate::render::{DrawFlags, Painter};

mod builder;
mod gemf_map;

pub use builder::GemfMapBuilder;
pub use gemf_map::GemfMap;

/// Map made of square raster tiles organized in zoom levels.
///
/// Positions on the map are given in map pixel coordinates: the origin is the projection of
/// (0, 0) longitude/latitude, X grows to the east and Y to the south. One map pixel is one tile
/// image pixel at the current zoom divided by the device ratio.
pub trait TiledMap {
    /// File the map is stored in.
    fn path(&self) -> &Path;

    /// File name of the map without extension.
    fn name(&self) -> String {
        self.path()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether the map was opened successfully.
    fn is_valid(&self) -> bool;

    /// Reason the map is invalid.
    fn error_string(&self) -> Option<&str>;

    /// Area covered by the map at the current zoom, in map pixels.
    fn bounds(&self) -> Rect;

    /// Ground meters per map pixel at the center of `rect`.
    fn resolution(&self, rect: &Rect) -> f64;

    /// Index of the current zoom level.
    fn zoom(&self) -> usize;

    /// Selects the most detailed zoom that shows the whole `rect` in a view of `size` pixels and
    /// returns its index. An invalid `rect` selects the most detailed zoom available.
    fn zoom_fit(&mut self, size: Size, rect: &GeoRect) -> usize;

    /// Switches to the next more detailed zoom if there is one.
    fn zoom_in(&mut self) -> usize;

    /// Switches to the next less detailed zoom if there is one.
    fn zoom_out(&mut self) -> usize;

    /// Converts geographic coordinates to map pixels at the current zoom.
    fn ll2xy(&self, c: Coordinates) -> Point2<f64>;

    /// Converts map pixels at the current zoom to geographic coordinates.
    fn xy2ll(&self, p: Point2<f64>) -> Coordinates;

    /// Sets the number of physical pixels per logical pixel. Non-positive values are ignored.
    fn set_device_ratio(&mut self, ratio: f64);

    /// Opens the map file for tile reads.
    fn load(&mut self);

    /// Closes the map file. Cached tiles can still be drawn.
    fn unload(&mut self);

    /// Draws all available tiles that intersect `rect`.
    fn draw(&self, painter: &mut dyn Painter, rect: &Rect, flags: DrawFlags);
}

/// Map of any of the supported formats.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyMap {
    /// GEMF tile container.
    Gemf(GemfMap),
}

impl AnyMap {
    /// Opens the map choosing the backend by the file content.
    pub fn open(path: impl AsRef<Path>, options: &MapOptions) -> Result<Self, MapError> {
        Self::open_with_cache(
            path,
            options,
            Arc::new(MemoryPixelCache::new(options.cache_capacity)),
        )
    }

    /// Same as [`AnyMap::open`], but decoded tiles are stored in a cache shared with other maps.
    pub fn open_with_cache(
        path: impl AsRef<Path>,
        options: &MapOptions,
        cache: Arc<dyn PixelCache>,
    ) -> Result<Self, MapError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        if gemf::sniff(&mut file) {
            let mut builder = GemfMapBuilder::new(path)
                .with_options(options.clone())
                .with_pixel_cache(cache);
            if options.decode_threads > 0 {
                builder = builder.with_decode_pool(Arc::new(DecodePool::with_threads(
                    options.decode_threads,
                )?));
            }

            return Ok(Self::Gemf(builder.try_build()?));
        }

        log::debug!("No map backend recognizes {}", path.display());
        Err(MapError::UnknownFormat)
    }

    fn inner(&self) -> &dyn TiledMap {
        match self {
            Self::Gemf(map) => map,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TiledMap {
        match self {
            Self::Gemf(map) => map,
        }
    }
}

impl TiledMap for AnyMap {
    fn path(&self) -> &Path {
        self.inner().path()
    }

    fn is_valid(&self) -> bool {
        self.inner().is_valid()
    }

    fn error_string(&self) -> Option<&str> {
        self.inner().error_string()
    }

    fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    fn resolution(&self, rect: &Rect) -> f64 {
        self.inner().resolution(rect)
    }

    fn zoom(&self) -> usize {
        self.inner().zoom()
    }

    fn zoom_fit(&mut self, size: Size, rect: &GeoRect) -> usize {
        self.inner_mut().zoom_fit(size, rect)
    }

    fn zoom_in(&mut self) -> usize {
        self.inner_mut().zoom_in()
    }

    fn zoom_out(&mut self) -> usize {
        self.inner_mut().zoom_out()
    }

    fn ll2xy(&self, c: Coordinates) -> Point2<f64> {
        self.inner().ll2xy(c)
    }

    fn xy2ll(&self, p: Point2<f64>) -> Coordinates {
        self.inner().xy2ll(p)
    }

    fn set_device_ratio(&mut self, ratio: f64) {
        self.inner_mut().set_device_ratio(ratio)
    }

    fn load(&mut self) {
        self.inner_mut().load()
    }

    fn unload(&mut self) {
        self.inner_mut().unload()
    }

    fn draw(&self, painter: &mut dyn Painter, rect: &Rect, flags: DrawFlags) {
        self.inner().draw(painter, rect, flags)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gemf::test_utils::{GemfFixture, RegionFixture};

    use super::*;

    #[test]
    fn open_gemf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Prague Center.gemf");
        GemfFixture::new(256)
            .with_source(0, "osm")
            .with_region(RegionFixture::new(10, 552, 554, 345, 347))
            .write_to(&path)
            .unwrap();

        let mut map = AnyMap::open(&path, &MapOptions::default()).unwrap();
        assert_matches!(map, AnyMap::Gemf(_));
        assert!(map.is_valid());
        assert_eq!(map.name(), "Prague Center");
        assert_eq!(map.zoom_in(), 0);

        let center = map.ll2xy(Coordinates::new(14.42, 50.08));
        assert!(map.bounds().intersection(&Rect::new(
            center.x - 1.0,
            center.y - 1.0,
            center.x + 1.0,
            center.y + 1.0
        ))
        .is_some());
    }

    #[test]
    fn unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

        assert_matches!(
            AnyMap::open(&path, &MapOptions::default()),
            Err(MapError::UnknownFormat)
        );
    }

    #[test]
    fn open_reports_format_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.gemf");
        let mut bytes = GemfFixture::new(256)
            .with_source(0, "osm")
            .with_region(RegionFixture::new(1, 0, 1, 0, 1))
            .to_bytes();
        bytes.truncate(20);
        std::fs::write(&path, bytes).unwrap();

        assert_matches!(
            AnyMap::open(&path, &MapOptions::default()),
            Err(MapError::Format(_))
        );
        assert_matches!(
            AnyMap::open(dir.path().join("missing.gemf"), &MapOptions::default()),
            Err(MapError::FsIo(_))
        );
    }
}
