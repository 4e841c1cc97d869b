//! Raster weight surface: tile sources, memoized caches, and sampling.

mod cache;
pub(crate) mod sampler;
pub(crate) mod tile;
mod weights;

pub use sampler::{MAX_ZOOM, MIN_ZOOM, RasterSampler};
pub use tile::{DirTileSource, NoRaster, TilePixels, TileSource};
pub use weights::{
    DEFAULT_SAMPLE_RADIUS_M, estimate_station_weights, normalize_weights, stencil_mean,
};

#[cfg(feature = "fetch")]
pub use tile::HttpTileSource;
