use std::sync::Arc;

use tracing::debug;

use crate::proj::{TileId, tile_address};
use crate::raster::cache::TileCache;
use crate::raster::tile::{TilePixels, TileSource};

/// Lowest zoom the weight surface is sampled at.
pub const MIN_ZOOM: u8 = 10;
/// Highest zoom the weight surface is sampled at.
pub const MAX_ZOOM: u8 = 16;

/// Samples the kriged weight surface from a tiled raster pyramid.
///
/// Raster absence must never abort a computation: any fetch, decode, or pixel
/// failure yields weight 0 for that sample only. Encoded tiles and decoded
/// pixel buffers are memoized separately for the lifetime of the sampler.
pub struct RasterSampler {
    source: Box<dyn TileSource>,
    encoded: TileCache<Vec<u8>>,
    decoded: TileCache<TilePixels>,
    zoom: u8,
}

impl RasterSampler {
    /// Create a sampler over `source`, clamping `zoom` to [10, 16].
    pub fn new(source: Box<dyn TileSource>, zoom: u8) -> Self {
        Self {
            source,
            encoded: TileCache::new(),
            decoded: TileCache::new(),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    #[inline]
    pub fn zoom(&self) -> u8 { self.zoom }

    /// Weight in [0, 1] at a geographic coordinate; 0 on any failure.
    pub fn sample(&self, lon: f64, lat: f64) -> f64 {
        let addr = tile_address(lon, lat, self.zoom);
        match self.pixels(addr.tile) {
            Some(pixels) => pixels.luminance(addr.px, addr.py).unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Decoded pixels for a tile, fetched and decoded at most once.
    fn pixels(&self, tile: TileId) -> Option<Arc<TilePixels>> {
        self.decoded.get_or_init(tile, || {
            let bytes = self.encoded.get_or_init(tile, || match self.source.fetch(tile) {
                Ok(bytes) => Some(Arc::new(bytes)),
                Err(err) => {
                    debug!(?tile, %err, "tile fetch failed; sampling as 0");
                    None
                }
            })?;
            match TilePixels::decode(&bytes) {
                Ok(pixels) => Some(Arc::new(pixels)),
                Err(err) => {
                    debug!(?tile, %err, "tile decode failed; sampling as 0");
                    None
                }
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use image::RgbaImage;

    use crate::raster::tile::NoRaster;

    /// Serves one solid-gray PNG for every tile and counts fetches.
    pub(crate) struct SolidSource {
        pub gray: u8,
        pub fetches: AtomicUsize,
    }

    impl SolidSource {
        pub(crate) fn new(gray: u8) -> Self {
            Self { gray, fetches: AtomicUsize::new(0) }
        }
    }

    impl TileSource for SolidSource {
        fn fetch(&self, _tile: TileId) -> Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            let image = RgbaImage::from_pixel(256, 256, image::Rgba([self.gray; 4]));
            let mut bytes = Vec::new();
            image::DynamicImage::ImageRgba8(image)
                .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
                .unwrap();
            Ok(bytes)
        }
    }

    #[test]
    fn samples_luminance_of_gray_tile() {
        let sampler = RasterSampler::new(Box::new(SolidSource::new(255)), 14);
        assert!((sampler.sample(-79.383, 43.653) - 1.0).abs() < 1e-9);

        let sampler = RasterSampler::new(Box::new(SolidSource::new(0)), 14);
        assert_eq!(sampler.sample(-79.383, 43.653), 0.0);
    }

    #[test]
    fn repeated_samples_fetch_once_per_tile() {
        let source = Arc::new(SolidSource::new(128));
        let sampler = RasterSampler::new(Box::new(source.clone()), 14);
        let first = sampler.sample(-79.383, 43.653);
        for _ in 0..20 {
            assert_eq!(sampler.sample(-79.383, 43.653), first);
        }
        // One fetch despite 21 samples of the same coordinate.
        assert_eq!(source.fetches.load(Ordering::Relaxed), 1);
        assert_eq!(sampler.encoded.len(), 1);
        assert_eq!(sampler.decoded.len(), 1);
    }

    #[test]
    fn missing_raster_samples_as_zero() {
        let sampler = RasterSampler::new(Box::new(NoRaster), 14);
        assert_eq!(sampler.sample(-79.383, 43.653), 0.0);
        assert_eq!(sampler.sample(0.0, 0.0), 0.0);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(RasterSampler::new(Box::new(NoRaster), 3).zoom(), 10);
        assert_eq!(RasterSampler::new(Box::new(NoRaster), 22).zoom(), 16);
        assert_eq!(RasterSampler::new(Box::new(NoRaster), 14).zoom(), 14);
    }
}
