#![doc = "Coverage planning public API"]
mod cover;
mod engine;
mod geometry;
mod io;
mod model;
mod proj;
mod raster;
mod territory;

#[doc(inline)]
pub use engine::Engine;

#[doc(inline)]
pub use model::{
    CoverParams, CoverReport, DemandPoint, Station, Territory, TerritoryMetric, TerritoryParams,
    TerritoryReport,
};

#[doc(inline)]
pub use cover::{
    CoverOutcome, CoverageSet, GridIndex, precompute_coverage, precompute_coverage_variable,
    radii_from_weights, solve,
};

#[doc(inline)]
pub use territory::{best_station, distance_territories, shade_territories, weighted_territories};

#[doc(inline)]
pub use raster::{
    DirTileSource, NoRaster, RasterSampler, TileSource, estimate_station_weights,
};

#[cfg(feature = "fetch")]
#[doc(inline)]
pub use raster::HttpTileSource;

#[doc(inline)]
pub use io::{
    boundary_from_geojson, cover_report_to_geojson, read_feature_collection,
    stations_from_geojson, territories_to_geojson,
};
