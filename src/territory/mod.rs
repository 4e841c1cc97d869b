//! Territory assignment (plain and weight-modulated) and raster shading.

mod assign;
mod shade;

pub use assign::{best_station, distance_territories, weighted_territories};
pub use shade::{palette_color, percentile, shade_territories, turbo_color};
