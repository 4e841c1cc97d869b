use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;

use crate::proj::TileId;

/// A source of encoded (PNG) raster tiles.
///
/// Implementations are expected to be cheap to call repeatedly; the sampler
/// memoizes results per tile key, so each key is fetched at most once per run.
pub trait TileSource: Send + Sync {
    fn fetch(&self, tile: TileId) -> Result<Vec<u8>>;
}

impl<T: TileSource + ?Sized> TileSource for std::sync::Arc<T> {
    fn fetch(&self, tile: TileId) -> Result<Vec<u8>> {
        (**self).fetch(tile)
    }
}

/// Reads tiles from a `{root}/{z}/{x}/{y}.png` directory pyramid.
pub struct DirTileSource {
    root: PathBuf,
}

impl DirTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TileSource for DirTileSource {
    fn fetch(&self, tile: TileId) -> Result<Vec<u8>> {
        let path = self.root
            .join(tile.z.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.png", tile.y));
        std::fs::read(&path).with_context(|| format!("[fetch] no tile at {}", path.display()))
    }
}

/// Fetches tiles over HTTP from a URL template containing `{z}`, `{x}`, `{y}`.
#[cfg(feature = "fetch")]
pub struct HttpTileSource {
    client: reqwest::blocking::Client,
    template: String,
}

#[cfg(feature = "fetch")]
impl HttpTileSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self { client: reqwest::blocking::Client::new(), template: template.into() }
    }
}

#[cfg(feature = "fetch")]
impl TileSource for HttpTileSource {
    fn fetch(&self, tile: TileId) -> Result<Vec<u8>> {
        let url = self.template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string());
        let response = self.client.get(&url).send()
            .with_context(|| format!("[fetch] request failed for {url}"))?
            .error_for_status()
            .with_context(|| format!("[fetch] bad status for {url}"))?;
        Ok(response.bytes()?.to_vec())
    }
}

/// A source with no raster configured; every fetch fails, so every sample
/// falls back to weight 0 ("no adjustment").
pub struct NoRaster;

impl TileSource for NoRaster {
    fn fetch(&self, _tile: TileId) -> Result<Vec<u8>> {
        Err(anyhow!("[fetch] no raster source configured"))
    }
}

/// A decoded RGBA tile.
pub struct TilePixels {
    image: RgbaImage,
}

impl TilePixels {
    /// Decode an encoded tile into pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .context("[decode] tile is not a decodable image")?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Relative luminance of the pixel at (px, py), in [0, 1].
    /// Returns `None` when the offset is outside the decoded image.
    pub fn luminance(&self, px: u32, py: u32) -> Option<f64> {
        if px >= self.image.width() || py >= self.image.height() {
            return None;
        }
        let [r, g, b, _] = self.image.get_pixel(px, py).0;
        Some((0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64) / 255.0)
    }
}
