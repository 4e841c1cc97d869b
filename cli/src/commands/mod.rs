pub mod cover;
pub mod territories;

use std::path::Path;

use anyhow::Result;
use covplan::{Engine, RasterSampler, TileSource};

use crate::cli::RasterArgs;

/// Load boundary and stations and assemble an engine with the requested
/// raster source (directory pyramid, URL template, or none).
pub fn build_engine(boundary: &Path, stations: &Path, raster: &RasterArgs) -> Result<Engine> {
    let boundary = covplan::boundary_from_geojson(&covplan::read_feature_collection(boundary)?)?;
    let stations = covplan::stations_from_geojson(&covplan::read_feature_collection(stations)?)?;

    let source = match &raster.tiles {
        Some(dir) => Box::new(covplan::DirTileSource::new(dir)) as Box<dyn TileSource>,
        None => remote_or_none(raster),
    };

    Ok(Engine::new(boundary, stations, RasterSampler::new(source, raster.zoom)))
}

#[cfg(feature = "fetch")]
fn remote_or_none(raster: &RasterArgs) -> Box<dyn TileSource> {
    match &raster.tile_url {
        Some(template) => Box::new(covplan::HttpTileSource::new(template.clone())),
        None => Box::new(covplan::NoRaster),
    }
}

#[cfg(not(feature = "fetch"))]
fn remote_or_none(_raster: &RasterArgs) -> Box<dyn TileSource> {
    Box::new(covplan::NoRaster)
}

pub fn write_geojson(path: &Path, value: &serde_json::Value) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
