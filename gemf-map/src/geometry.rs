//! Screen and geographic rectangles used by the map API.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis aligned rectangle in map pixel space. Y axis points down.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x_min: f64,
    /// Top edge.
    pub y_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Bottom edge.
    pub y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Rectangle spanning two corner points.
    pub fn from_corners(top_left: Point2<f64>, bottom_right: Point2<f64>) -> Self {
        Self::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Top left corner.
    pub fn top_left(&self) -> Point2<f64> {
        Point2::new(self.x_min, self.y_min)
    }

    /// Center point.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Returns true if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Common part of two rectangles, `None` if they do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let rect = Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        };

        (!rect.is_empty()).then_some(rect)
    }
}

/// Size of a view in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns true if either of the dimensions is zero.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

impl Coordinates {
    /// Creates new coordinates from longitude and latitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Checks that longitude and latitude are in their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

/// Geographic rectangle given by its north-west and south-east corners.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    top_left: Coordinates,
    bottom_right: Coordinates,
}

impl GeoRect {
    /// Creates a new rectangle.
    pub const fn new(top_left: Coordinates, bottom_right: Coordinates) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// North-west corner.
    pub fn top_left(&self) -> Coordinates {
        self.top_left
    }

    /// South-east corner.
    pub fn bottom_right(&self) -> Coordinates {
        self.bottom_right
    }

    /// Northern edge latitude.
    pub fn top(&self) -> f64 {
        self.top_left.lat
    }

    /// Southern edge latitude.
    pub fn bottom(&self) -> f64 {
        self.bottom_right.lat
    }

    /// Both corners are valid coordinates and do not coincide.
    pub fn is_valid(&self) -> bool {
        self.top_left.is_valid() && self.bottom_right.is_valid() && self.top_left != self.bottom_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_dimensions() {
        let rect = Rect::new(-10.0, 5.0, 30.0, 25.0);
        assert_eq!(rect.width(), 40.0);
        assert_eq!(rect.height(), 20.0);
        assert_eq!(rect.center(), Point2::new(10.0, 15.0));
        assert!(!rect.is_empty());
        assert!(Rect::new(1.0, 1.0, 1.0, 5.0).is_empty());
        assert!(Rect::new(f64::NAN, 1.0, 1.0, 5.0).is_empty());
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            a.intersection(&Rect::new(5.0, -5.0, 20.0, 8.0)),
            Some(Rect::new(5.0, 0.0, 10.0, 8.0))
        );
        assert_eq!(a.intersection(&Rect::new(10.0, 0.0, 20.0, 10.0)), None);
        assert_eq!(a.intersection(&Rect::new(-5.0, 20.0, 5.0, 30.0)), None);
    }

    #[test]
    fn geo_rect_validity() {
        let rect = GeoRect::new(Coordinates::new(10.0, 50.0), Coordinates::new(12.0, 48.0));
        assert!(rect.is_valid());
        assert!(!GeoRect::default().is_valid());
        assert!(!GeoRect::new(Coordinates::new(190.0, 50.0), Coordinates::new(12.0, 48.0)).is_valid());
        assert!(!GeoRect::new(Coordinates::new(10.0, 50.0), Coordinates::new(10.0, 50.0)).is_valid());
    }
}
