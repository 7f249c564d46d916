//! This module contains utilities for decoding tile images.

use crate::error::MapError;

/// An image that has been decoded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    dimensions: (u32, u32),
}

impl DecodedImage {
    /// Decode an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA images
    /// will be converted to RGBA.
    pub fn new(bytes: &[u8]) -> Result<Self, MapError> {
        use image::GenericImageView;
        let decoded = image::load_from_memory(bytes)?;
        let dimensions = decoded.dimensions();
        let bytes = decoded.into_rgba8();

        Ok(Self {
            bytes: bytes.into_vec(),
            dimensions,
        })
    }

    /// Raw bytes of the image, in RGBA order.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    /// Image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.dimensions.0 == 0 || self.dimensions.1 == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;
    use image::{ImageOutputFormat, Rgba, RgbaImage};

    use super::*;

    /// PNG encoded single color image.
    pub(crate) fn png(size: u32, color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(size, size, Rgba(color));
        let mut out = Cursor::new(vec![]);
        image
            .write_to(&mut out, ImageOutputFormat::Png)
            .expect("failed to encode png");
        out.into_inner()
    }

    #[test]
    fn decode_png() {
        let image = DecodedImage::new(&png(4, [10, 20, 30, 255])).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
        assert_eq!(image.bytes().len(), 4 * 4 * 4);
        assert_eq!(&image.bytes()[..4], &[10, 20, 30, 255]);
        assert!(!image.is_empty());
    }

    #[test]
    fn decode_garbage() {
        assert_matches!(
            DecodedImage::new(b"not an image"),
            Err(MapError::ImageDecode(_))
        );
        assert_matches!(DecodedImage::new(&[]), Err(MapError::ImageDecode(_)));
    }
}
