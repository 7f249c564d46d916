use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use gemf::{GemfError, GemfIndex, TileCoord, Zoom};
use nalgebra::{Point2, Vector2};
use parking_lot::Mutex;

use super::{GemfMapBuilder, TiledMap};
use crate::cache::{tile_cache_key, PixelCache};
use crate::decode_pool::DecodePool;
use crate::decoded_image::DecodedImage;
use crate::error::MapError;
use crate::geometry::{Coordinates, GeoRect, Rect, Size};
use crate::projection::{self, BOUNDS};
use crate::render::{DrawFlags, Painter};

/// Map stored in a GEMF tile container.
///
/// The file is fully indexed when the map is opened. A map that failed to open stays invalid
/// forever and keeps the reason in [`TiledMap::error_string`]; all other operations are no-ops on
/// an invalid map. Tiles are read only between [`TiledMap::load`] and [`TiledMap::unload`].
///
/// The map can be drawn from several threads. Tile reads share one file handle, so each index
/// record lookup and data read runs under the file lock.
pub struct GemfMap {
    path: PathBuf,
    state: MapState,
    file: Mutex<Option<File>>,
    zoom_index: usize,
    device_ratio: f64,
    cache: Arc<dyn PixelCache>,
    pool: Arc<DecodePool>,
}

enum MapState {
    Valid { index: GemfIndex, bounds: GeoRect },
    Invalid(String),
}

/// Tile missing from the pixel cache, waiting to be decoded.
struct RenderJob {
    tile: TileCoord,
    data: Bytes,
    key: String,
}

impl std::fmt::Debug for GemfMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GemfMap")
            .field("path", &self.path)
            .field("valid", &self.is_valid())
            .field("loaded", &self.is_loaded())
            .field("zoom_index", &self.zoom_index)
            .field("device_ratio", &self.device_ratio)
            .finish()
    }
}

impl GemfMap {
    /// Opens the map with default options. Check [`TiledMap::is_valid`] before using it.
    pub fn open(path: impl AsRef<Path>) -> Self {
        GemfMapBuilder::new(path).build()
    }

    /// Opens the map with default options, failing if the file cannot be indexed.
    pub fn try_open(path: impl AsRef<Path>) -> Result<Self, MapError> {
        GemfMapBuilder::new(path).try_build()
    }

    pub(super) fn new(
        path: PathBuf,
        parsed: Result<(GemfIndex, GeoRect), MapError>,
        device_ratio: f64,
        cache: Arc<dyn PixelCache>,
        pool: Arc<DecodePool>,
    ) -> Self {
        let state = match parsed {
            Ok((index, bounds)) => {
                log::info!(
                    "Opened GEMF map {}: {} zoom levels, tile size {}",
                    path.display(),
                    index.zooms().len(),
                    index.tile_size()
                );
                MapState::Valid { index, bounds }
            }
            Err(err) => {
                log::warn!("Failed to open GEMF map {}: {err}", path.display());
                MapState::Invalid(err.to_string())
            }
        };

        Self {
            path,
            state,
            file: Mutex::new(None),
            zoom_index: 0,
            device_ratio,
            cache,
            pool,
        }
    }

    /// Reads the index of the file and computes the map bounds.
    pub(super) fn parse(path: &Path) -> Result<(GemfIndex, GeoRect), MapError> {
        let file = File::open(path)?;
        let index = GemfIndex::read(&mut BufReader::new(file))?;
        let bounds = compute_bounds(index.zooms())?;

        Ok((index, bounds))
    }

    /// Parsed file index, `None` for an invalid map.
    pub fn index(&self) -> Option<&GemfIndex> {
        match &self.state {
            MapState::Valid { index, .. } => Some(index),
            MapState::Invalid(_) => None,
        }
    }

    /// Zoom levels of the map, sorted ascending.
    pub fn zooms(&self) -> &[Zoom] {
        self.index().map(GemfIndex::zooms).unwrap_or_default()
    }

    /// Geographic extent of the map.
    pub fn geo_bounds(&self) -> Option<GeoRect> {
        match &self.state {
            MapState::Valid { bounds, .. } => Some(*bounds),
            MapState::Invalid(_) => None,
        }
    }

    /// Number of physical pixels per logical pixel of the output device.
    pub fn device_ratio(&self) -> f64 {
        self.device_ratio
    }

    /// Edge of a tile in logical pixels.
    pub fn tile_size(&self) -> f64 {
        self.index()
            .map(|index| index.tile_size() as f64 / self.device_ratio)
            .unwrap_or_default()
    }

    /// Whether the file is open for tile reads.
    pub fn is_loaded(&self) -> bool {
        self.file.lock().is_some()
    }

    fn current_zoom(&self) -> Option<(&Zoom, u32)> {
        let index = self.index()?;
        Some((index.zooms().get(self.zoom_index)?, index.tile_size()))
    }

    /// Projected meters per map pixel at the current zoom, `None` for an invalid map.
    fn scale(&self) -> Option<f64> {
        let (zoom, tile_size) = self.current_zoom()?;
        Some(projection::zoom2scale(zoom.level, tile_size))
    }

    fn m2xy(&self, m: Point2<f64>, scale: f64) -> Point2<f64> {
        Point2::new(m.x / scale, m.y / -scale) / self.device_ratio
    }

    fn xy2m(&self, p: Point2<f64>, scale: f64) -> Point2<f64> {
        Point2::new(p.x * scale, -p.y * scale) * self.device_ratio
    }

    /// Raw image bytes of the tile at the current zoom.
    pub fn tile_data(&self, tile: TileCoord) -> Result<Bytes, MapError> {
        let index = self.index().ok_or(MapError::NotFound)?;
        let mut file = self.file.lock();
        let file = file.as_mut().ok_or(MapError::NotFound)?;

        index
            .tile_data(file, self.zoom_index, tile)
            .map_err(|err| match err {
                GemfError::Io(err) => MapError::FsIo(err),
                _ => MapError::NotFound,
            })
    }
}

/// Geographic extent of the lowest zoom level.
fn compute_bounds(zooms: &[Zoom]) -> Result<GeoRect, MapError> {
    let zoom = zooms
        .first()
        .ok_or_else(|| MapError::Bounds("no zoom levels".into()))?;
    let rect = zoom
        .rect()
        .ok_or_else(|| MapError::Bounds(format!("empty region rectangle at level {}", zoom.level)))?;

    let top_left = projection::tile2ll(TileCoord::new(rect.min_x, rect.min_y), zoom.level);
    let bottom_right = projection::tile2ll(
        TileCoord::new(rect.max_x.saturating_add(1), rect.max_y.saturating_add(1)),
        zoom.level,
    );

    // Levels 0 and 1 overshoot the Mercator limit due to numerical instability
    Ok(GeoRect::new(
        Coordinates::new(top_left.lon, top_left.lat.min(BOUNDS.top())),
        Coordinates::new(bottom_right.lon, bottom_right.lat.max(BOUNDS.bottom())),
    ))
}

impl TiledMap for GemfMap {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self) -> bool {
        matches!(self.state, MapState::Valid { .. })
    }

    fn error_string(&self) -> Option<&str> {
        match &self.state {
            MapState::Valid { .. } => None,
            MapState::Invalid(error) => Some(error),
        }
    }

    fn bounds(&self) -> Rect {
        match self.geo_bounds() {
            Some(bounds) => Rect::from_corners(
                self.ll2xy(bounds.top_left()),
                self.ll2xy(bounds.bottom_right()),
            ),
            None => Rect::default(),
        }
    }

    fn resolution(&self, rect: &Rect) -> f64 {
        let (Some((zoom, tile_size)), Some(scale)) = (self.current_zoom(), self.scale()) else {
            return 0.0;
        };

        projection::resolution(self.xy2m(rect.center(), scale), zoom.level, tile_size)
    }

    fn zoom(&self) -> usize {
        self.zoom_index
    }

    fn zoom_fit(&mut self, size: Size, rect: &GeoRect) -> usize {
        let Some(index) = self.index() else {
            return self.zoom_index;
        };
        if size.is_zero() {
            return self.zoom_index;
        }
        let zooms = index.zooms();

        self.zoom_index = if !rect.is_valid() {
            zooms.len().saturating_sub(1)
        } else {
            let top_left = projection::ll2m(rect.top_left());
            let bottom_right = projection::ll2m(rect.bottom_right());
            let scale_x = (bottom_right.x - top_left.x) / size.width();
            let scale_y = (bottom_right.y - top_left.y) / size.height();
            let level = projection::scale2zoom(
                scale_x.max(-scale_y) / self.device_ratio,
                index.tile_size(),
            );

            zooms
                .iter()
                .enumerate()
                .skip(1)
                .take_while(|(_, zoom)| zoom.level <= level)
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0)
        };

        self.zoom_index
    }

    fn zoom_in(&mut self) -> usize {
        let last = self.zooms().len().saturating_sub(1);
        self.zoom_index = (self.zoom_index + 1).min(last);
        self.zoom_index
    }

    fn zoom_out(&mut self) -> usize {
        self.zoom_index = self.zoom_index.saturating_sub(1);
        self.zoom_index
    }

    fn ll2xy(&self, c: Coordinates) -> Point2<f64> {
        match self.scale() {
            Some(scale) => self.m2xy(projection::ll2m(c), scale),
            None => Point2::origin(),
        }
    }

    fn xy2ll(&self, p: Point2<f64>) -> Coordinates {
        match self.scale() {
            Some(scale) => projection::m2ll(self.xy2m(p, scale)),
            None => Coordinates::default(),
        }
    }

    fn set_device_ratio(&mut self, ratio: f64) {
        if ratio.is_finite() && ratio > 0.0 {
            self.device_ratio = ratio;
        } else {
            log::warn!("Ignoring invalid device pixel ratio {ratio}");
        }
    }

    fn load(&mut self) {
        let file = self.file.get_mut();
        if file.is_some() {
            return;
        }

        match File::open(&self.path) {
            Ok(opened) => *file = Some(opened),
            Err(err) => log::warn!("Failed to load {}: {err}", self.path.display()),
        }
    }

    fn unload(&mut self) {
        *self.file.get_mut() = None;
    }

    fn draw(&self, painter: &mut dyn Painter, rect: &Rect, _flags: DrawFlags) {
        let (Some((zoom, tile_size)), Some(scale)) = (self.current_zoom(), self.scale()) else {
            return;
        };
        let Some(visible) = rect.intersection(&self.bounds()) else {
            return;
        };

        let tile_px = tile_size as f64 / self.device_ratio;
        let first = projection::mercator2tile(self.xy2m(visible.top_left(), scale), zoom.level);
        let origin = self.m2xy(projection::tile2mercator(first, zoom.level), scale);
        let columns = ((visible.x_max - origin.x) / tile_px).ceil() as i32;
        let rows = ((visible.y_max - origin.y) / tile_px).ceil() as i32;

        let position = |tile: TileCoord| {
            origin
                + Vector2::new(
                    (tile.x - first.x) as f64 * tile_px,
                    (tile.y - first.y) as f64 * tile_px,
                )
        };

        let mut jobs = vec![];
        for i in 0..columns {
            for j in 0..rows {
                let tile = TileCoord::new(first.x + i, first.y + j);
                let key = tile_cache_key(&self.path, zoom.level, tile);

                if let Some(image) = self.cache.find(&key) {
                    painter.draw_image(position(tile), &image, self.device_ratio);
                    continue;
                }

                match self.tile_data(tile) {
                    Ok(data) => jobs.push(RenderJob { tile, data, key }),
                    Err(err) => log::debug!("Skipping tile {key}: {err}"),
                }
            }
        }

        let decoded = self.pool.run(jobs, |job| {
            let image = DecodedImage::new(&job.data);
            (job, image)
        });

        for (job, image) in decoded {
            match image {
                Ok(image) if !image.is_empty() => {
                    let image = Arc::new(image);
                    self.cache.insert(job.key, image.clone());
                    painter.draw_image(position(job.tile), &image, self.device_ratio);
                }
                Ok(_) => log::debug!("Tile {} is an empty image", job.key),
                Err(err) => log::debug!("Failed to decode tile {}: {err}", job.key),
            }
        }
    }
}
