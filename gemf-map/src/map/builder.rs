use std::path::{Path, PathBuf};
use std::sync::Arc;

use gemf::GemfIndex;

use super::{GemfMap, TiledMap};
use crate::cache::{MemoryPixelCache, PixelCache};
use crate::decode_pool::DecodePool;
use crate::error::MapError;
use crate::geometry::GeoRect;
use crate::options::MapOptions;

/// Convenience type to open a [GemfMap].
///
/// ```no_run
/// use std::sync::Arc;
/// use gemf_map::{GemfMapBuilder, MemoryPixelCache, TiledMap};
///
/// let cache = Arc::new(MemoryPixelCache::new(512));
/// let map = GemfMapBuilder::new("/maps/prague.gemf")
///     .with_device_ratio(2.0)
///     .with_pixel_cache(cache)
///     .build();
///
/// if !map.is_valid() {
///     eprintln!("{}", map.error_string().unwrap_or_default());
/// }
/// ```
pub struct GemfMapBuilder {
    path: PathBuf,
    options: MapOptions,
    cache: Option<Arc<dyn PixelCache>>,
    pool: Option<Arc<DecodePool>>,
}

impl GemfMapBuilder {
    /// Starts building a map stored in the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: MapOptions::default(),
            cache: None,
            pool: None,
        }
    }

    /// Replaces all options. Explicitly set cache and decode pool still take precedence.
    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the number of physical pixels per logical pixel. Defaults to 1.
    pub fn with_device_ratio(mut self, ratio: f64) -> Self {
        self.options.device_ratio = ratio;
        self
    }

    /// Shares the pixel cache with other maps.
    ///
    /// If not set, every map gets its own [`MemoryPixelCache`] of
    /// [`MapOptions::cache_capacity`] entries.
    pub fn with_pixel_cache(mut self, cache: Arc<dyn PixelCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the pool decoding the tiles. If not set, the pool is created according to
    /// [`MapOptions::decode_threads`].
    pub fn with_decode_pool(mut self, pool: Arc<DecodePool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Opens the map. Errors are not returned but make the map invalid, see
    /// [`TiledMap::error_string`](crate::TiledMap::error_string).
    pub fn build(self) -> GemfMap {
        let parsed = GemfMap::parse(&self.path);
        self.finish(parsed)
    }

    /// Opens the map, failing if the file cannot be read or is not a valid GEMF file.
    pub fn try_build(self) -> Result<GemfMap, MapError> {
        let parsed = GemfMap::parse(&self.path)?;
        Ok(self.finish(Ok(parsed)))
    }

    fn finish(self, parsed: Result<(GemfIndex, GeoRect), MapError>) -> GemfMap {
        let Self {
            path,
            options,
            cache,
            pool,
        } = self;

        let cache =
            cache.unwrap_or_else(|| Arc::new(MemoryPixelCache::new(options.cache_capacity)));
        let pool = pool.unwrap_or_else(|| Arc::new(decode_pool(options.decode_threads)));

        let mut map = GemfMap::new(path, parsed, 1.0, cache, pool);
        map.set_device_ratio(options.device_ratio);
        map
    }
}

fn decode_pool(threads: usize) -> DecodePool {
    if threads == 0 {
        return DecodePool::global();
    }

    DecodePool::with_threads(threads).unwrap_or_else(|err| {
        log::warn!("{err}, falling back to the global pool");
        DecodePool::global()
    })
}

#[cfg(test)]
mod tests {
    use gemf::test_utils::{GemfFixture, RegionFixture};

    use super::*;

    fn write_map(dir: &Path) -> PathBuf {
        let path = dir.join("map.gemf");
        GemfFixture::new(256)
            .with_region(RegionFixture::new(3, 0, 7, 0, 7))
            .write_to(&path)
            .unwrap();
        path
    }

    #[test]
    fn build_with_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_map(dir.path());

        let map = GemfMapBuilder::new(&path)
            .with_options(MapOptions {
                device_ratio: 1.5,
                cache_capacity: 16,
                decode_threads: 1,
            })
            .build();

        assert!(map.is_valid());
        assert_eq!(map.path(), path);
        assert_eq!(map.device_ratio(), 1.5);
    }

    #[test]
    fn invalid_device_ratio_falls_back_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let map = GemfMapBuilder::new(write_map(dir.path()))
            .with_device_ratio(-1.0)
            .build();

        assert_eq!(map.device_ratio(), 1.0);
    }

    #[test]
    fn shared_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_map(dir.path());
        let cache = Arc::new(MemoryPixelCache::new(8));

        let first = GemfMapBuilder::new(&path)
            .with_pixel_cache(cache.clone())
            .build();
        let second = GemfMapBuilder::new(&path)
            .with_pixel_cache(cache.clone())
            .build();

        assert!(first.is_valid() && second.is_valid());
        assert_eq!(Arc::strong_count(&cache), 3);
    }

    #[test]
    fn try_build_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GemfMapBuilder::new(dir.path().join("none.gemf"))
            .try_build()
            .is_err());
    }
}
