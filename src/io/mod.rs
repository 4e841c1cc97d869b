//! GeoJSON input and output.

mod geojson;

pub use geojson::{
    boundary_from_geojson, cover_report_to_geojson, read_feature_collection,
    stations_from_geojson, territories_to_geojson,
};
