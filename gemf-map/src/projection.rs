//! Web Mercator transformations between geographic coordinates, projected meters and tile indices.
//!
//! Projected coordinates are meters on the WGS84 sphere with Y growing to the north. Tile indices
//! grow to the east and to the south, starting at the north-west corner of the projected world.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use gemf::TileCoord;
use nalgebra::Point2;

use crate::geometry::{Coordinates, GeoRect};

/// WGS84 semi-major axis.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Length of the equator of the projected world.
pub const WORLD_WIDTH: f64 = 2.0 * PI * EARTH_RADIUS;

/// Part of the world covered by Web Mercator tiles.
pub const BOUNDS: GeoRect = GeoRect::new(
    Coordinates::new(-180.0, 85.0511),
    Coordinates::new(180.0, -85.0511),
);

const EPSILON: f64 = 1e-6;

/// Projects geographic coordinates to Mercator meters.
pub fn ll2m(c: Coordinates) -> Point2<f64> {
    Point2::new(
        EARTH_RADIUS * c.lon.to_radians(),
        EARTH_RADIUS * (FRAC_PI_4 + c.lat.to_radians() / 2.0).tan().ln(),
    )
}

/// Inverse of [`ll2m`].
pub fn m2ll(p: Point2<f64>) -> Coordinates {
    Coordinates::new(
        (p.x / EARTH_RADIUS).to_degrees(),
        (2.0 * (p.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees(),
    )
}

/// Number of tiles along one axis at the zoom level.
fn tile_count(zoom: i32) -> f64 {
    2f64.powi(zoom)
}

/// Tile containing the projected point.
pub fn mercator2tile(m: Point2<f64>, zoom: i32) -> TileCoord {
    let n = tile_count(zoom);
    TileCoord::new(
        ((m.x + WORLD_WIDTH / 2.0) / WORLD_WIDTH * n).floor() as i32,
        ((1.0 - m.y / (WORLD_WIDTH / 2.0)) / 2.0 * n).floor() as i32,
    )
}

/// Projected coordinates of the north-west corner of a tile.
pub fn tile2mercator(tile: TileCoord, zoom: i32) -> Point2<f64> {
    let n = tile_count(zoom);
    Point2::new(
        WORLD_WIDTH * (tile.x as f64 / n) - WORLD_WIDTH / 2.0,
        WORLD_WIDTH / 2.0 - WORLD_WIDTH * (tile.y as f64 / n),
    )
}

/// Geographic coordinates of the north-west corner of a tile.
pub fn tile2ll(tile: TileCoord, zoom: i32) -> Coordinates {
    m2ll(tile2mercator(tile, zoom))
}

/// Projected meters per pixel at the zoom level.
pub fn zoom2scale(zoom: i32, tile_size: u32) -> f64 {
    WORLD_WIDTH / (tile_count(zoom) * tile_size as f64)
}

/// Zoom level with the given projected meters per pixel. Exact inverse of [`zoom2scale`] for
/// integral zoom levels, non-integral results are truncated.
pub fn scale2zoom(scale: f64, tile_size: u32) -> i32 {
    ((WORLD_WIDTH / (scale * tile_size as f64)).log2() + EPSILON) as i32
}

/// Ground resolution in meters per pixel at the projected point.
pub fn resolution(m: Point2<f64>, zoom: i32, tile_size: u32) -> f64 {
    zoom2scale(zoom, tile_size) * m2ll(m).lat.to_radians().cos()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn zoom_scale_round_trip() {
        for tile_size in [256, 512] {
            for zoom in 0..=22 {
                assert_eq!(scale2zoom(zoom2scale(zoom, tile_size), tile_size), zoom);
            }
        }

        assert_abs_diff_eq!(zoom2scale(0, 256), 156543.03392804097, epsilon = 1e-6);
        assert_eq!(scale2zoom(zoom2scale(3, 256) * 1.5, 256), 2);
    }

    #[test]
    fn ll_m_round_trip() {
        for (lon, lat) in [(0.0, 0.0), (14.42, 50.08), (-122.4, 37.77), (179.0, -84.0)] {
            let c = m2ll(ll2m(Coordinates::new(lon, lat)));
            assert_abs_diff_eq!(c.lon, lon, epsilon = 1e-9);
            assert_abs_diff_eq!(c.lat, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn ll2m_known_values() {
        let m = ll2m(Coordinates::new(180.0, 0.0));
        assert_abs_diff_eq!(m.x, 20037508.342789244, epsilon = 1e-6);
        assert_abs_diff_eq!(m.y, 0.0, epsilon = 1e-6);

        let m = ll2m(Coordinates::new(0.0, 85.0511287798));
        assert_abs_diff_eq!(m.y, 20037508.34, epsilon = 1.0);
    }

    #[test]
    fn tile_corners() {
        let c = tile2ll(TileCoord::new(0, 0), 0);
        assert_abs_diff_eq!(c.lon, -180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.lat, 85.0511287798, epsilon = 1e-9);

        let c = tile2ll(TileCoord::new(1, 1), 1);
        assert_abs_diff_eq!(c.lon, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.lat, 0.0, epsilon = 1e-9);

        let c = tile2ll(TileCoord::new(4, 4), 2);
        assert_abs_diff_eq!(c.lon, 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.lat, -85.0511287798, epsilon = 1e-9);
    }

    #[test]
    fn tile_of_point() {
        assert_eq!(
            mercator2tile(ll2m(Coordinates::new(14.42, 50.08)), 10),
            TileCoord::new(553, 346)
        );
        assert_eq!(mercator2tile(Point2::new(1.0, 1.0), 1), TileCoord::new(1, 0));
        assert_eq!(mercator2tile(Point2::new(-1.0, -1.0), 1), TileCoord::new(0, 1));

        for zoom in [2, 5, 12] {
            let tile = TileCoord::new(3, 1);
            let corner = tile2mercator(tile, zoom);
            let inside = Point2::new(corner.x + 1e-3, corner.y - 1e-3);
            assert_eq!(mercator2tile(inside, zoom), tile);
        }
    }

    #[test]
    fn resolution_shrinks_with_latitude() {
        let equator = resolution(Point2::new(0.0, 0.0), 10, 256);
        assert_abs_diff_eq!(equator, zoom2scale(10, 256), epsilon = 1e-9);

        let north = resolution(ll2m(Coordinates::new(0.0, 60.0)), 10, 256);
        assert_abs_diff_eq!(north, equator / 2.0, epsilon = 1e-6);
    }
}
