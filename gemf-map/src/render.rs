//! Drawing surface the maps render their tiles onto.

use nalgebra::Point2;

use crate::decoded_image::DecodedImage;

/// Surface tile images are drawn onto.
pub trait Painter {
    /// Draws the image with its top left corner at `position`, in map pixel coordinates.
    ///
    /// `device_ratio` is the number of image pixels per map pixel, the image covers
    /// `width / device_ratio` by `height / device_ratio` map pixels.
    fn draw_image(&mut self, position: Point2<f64>, image: &DecodedImage, device_ratio: f64);
}

/// Rendering hints passed to [`TiledMap::draw`](crate::TiledMap::draw).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DrawFlags(u32);

impl DrawFlags {
    /// No hints.
    pub const NONE: Self = Self(0);
    /// Output is static (print, image export) and must contain every available tile.
    pub const BLOCK: Self = Self(1);
    /// Target surface is GPU backed.
    pub const OPEN_GL: Self = Self(2);

    /// All flags of `other` are set.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for DrawFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let flags = DrawFlags::BLOCK | DrawFlags::OPEN_GL;
        assert!(flags.contains(DrawFlags::BLOCK));
        assert!(flags.contains(DrawFlags::OPEN_GL));
        assert!(!DrawFlags::NONE.contains(DrawFlags::BLOCK));
        assert!(DrawFlags::BLOCK.contains(DrawFlags::NONE));
    }
}
