//! Rendering of offline tiled maps stored in GEMF containers.
//!
//! A map is opened with [`GemfMap::open`], [`GemfMapBuilder`] or, when the format of the file is
//! not known in advance, with [`AnyMap::open`]. All maps implement [`TiledMap`], which is the
//! only interface a viewer needs:
//!
//! * zoom control: [`TiledMap::zoom_in`], [`TiledMap::zoom_out`], [`TiledMap::zoom_fit`];
//! * conversions between geographic coordinates and map pixels: [`TiledMap::ll2xy`] and
//!   [`TiledMap::xy2ll`];
//! * rendering of the visible part of the map onto a [`Painter`] with [`TiledMap::draw`].
//!
//! ```no_run
//! use gemf_map::{DrawFlags, GemfMap, Painter, Rect, TiledMap};
//! # struct Canvas;
//! # impl Painter for Canvas {
//! #     fn draw_image(&mut self, _: nalgebra::Point2<f64>, _: &gemf_map::DecodedImage, _: f64) {}
//! # }
//!
//! let mut map = GemfMap::open("/maps/europe.gemf");
//! map.load();
//! map.zoom_in();
//!
//! let mut canvas = Canvas;
//! map.draw(&mut canvas, &Rect::new(-400.0, -300.0, 400.0, 300.0), DrawFlags::NONE);
//! ```
//!
//! Decoded tiles are kept in a [`PixelCache`] shared between frames and optionally between
//! maps. Tiles missing from the cache are decoded in parallel on a [`DecodePool`].

pub mod cache;
mod decode_pool;
pub mod decoded_image;
pub mod error;
mod geometry;
mod map;
mod options;
pub mod projection;
pub mod render;

pub use cache::{MemoryPixelCache, PixelCache};
pub use decode_pool::DecodePool;
pub use decoded_image::DecodedImage;
pub use error::MapError;
pub use geometry::{Coordinates, GeoRect, Rect, Size};
pub use map::{AnyMap, GemfMap, GemfMapBuilder, TiledMap};
pub use options::MapOptions;
pub use render::{DrawFlags, Painter};

// Reexport the container reader
pub use gemf;
