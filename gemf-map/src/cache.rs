//! Store of decoded tile images shared between frames and maps.

use std::path::Path;
use std::sync::Arc;

use gemf::TileCoord;
use quick_cache::sync::Cache;

use crate::decoded_image::DecodedImage;

/// Default number of images kept by [`MemoryPixelCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Key-value store of decoded tile images.
///
/// Implementations must be safe to use from several threads and decide on their own when entries
/// are evicted.
pub trait PixelCache: Send + Sync {
    /// Returns the image stored under the key.
    fn find(&self, key: &str) -> Option<Arc<DecodedImage>>;
    /// Stores the image under the key, replacing the previous one.
    fn insert(&self, key: String, image: Arc<DecodedImage>);
}

/// Cache key of a tile: `{map path}-{zoom level}_{x}_{y}`.
///
/// The path identifies the map, so several maps can share one cache.
pub fn tile_cache_key(map_path: &Path, level: i32, tile: TileCoord) -> String {
    format!("{}-{level}_{}_{}", map_path.display(), tile.x, tile.y)
}

/// In-memory [`PixelCache`] with bounded number of entries.
pub struct MemoryPixelCache {
    images: Cache<String, Arc<DecodedImage>>,
    capacity: usize,
}

impl MemoryPixelCache {
    /// Creates a cache holding at most `capacity` images.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            images: Cache::new(capacity),
            capacity,
        }
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Cache has no images.
    pub fn is_empty(&self) -> bool {
        self.images.len() == 0
    }

    /// Drops all cached images.
    pub fn clear(&self) {
        self.images.clear();
    }
}

impl Default for MemoryPixelCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for MemoryPixelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPixelCache")
            .field("len", &self.images.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl PixelCache for MemoryPixelCache {
    fn find(&self, key: &str) -> Option<Arc<DecodedImage>> {
        self.images.get(key)
    }

    fn insert(&self, key: String, image: Arc<DecodedImage>) {
        self.images.insert(key, image);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::decoded_image::tests::png;

    #[test]
    fn key_schema() {
        let path = PathBuf::from("/maps/world.gemf");
        assert_eq!(
            tile_cache_key(&path, 12, TileCoord::new(2200, 1343)),
            "/maps/world.gemf-12_2200_1343"
        );
        assert_ne!(
            tile_cache_key(&path, 1, TileCoord::new(11, 1)),
            tile_cache_key(&path, 11, TileCoord::new(1, 1))
        );
    }

    #[test]
    fn insert_and_find() {
        let cache = MemoryPixelCache::new(8);
        assert!(cache.is_empty());
        assert!(cache.find("a").is_none());

        let image = Arc::new(DecodedImage::new(&png(2, [1, 2, 3, 4])).unwrap());
        cache.insert("a".to_string(), image.clone());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.find("a"), Some(image));
        assert!(cache.find("b").is_none());

        cache.clear();
        assert!(cache.find("a").is_none());
    }
}
