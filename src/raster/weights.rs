use std::f64::consts::FRAC_1_SQRT_2;

use crate::model::Station;
use crate::proj::{to_geographic, to_planar};
use crate::raster::RasterSampler;

/// Default planar offset of the sampling stencil around a station (meters).
pub const DEFAULT_SAMPLE_RADIUS_M: f64 = 600.0;

/// Range floor guarding min-max normalization against an all-equal input.
const RANGE_FLOOR: f64 = 1e-6;

/// The station itself plus unit vectors toward the 8 compass directions.
const STENCIL: [(f64, f64); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Mean raster weight over the 9-point stencil centered on (lon, lat).
/// Offsets are applied in the planar frame and sampled back in geographic.
pub fn stencil_mean(sampler: &RasterSampler, lon: f64, lat: f64, sample_radius_m: f64) -> f64 {
    let (sx, sy) = to_planar(lon, lat);
    let sum: f64 = STENCIL.iter()
        .map(|&(dx, dy)| {
            let (plon, plat) = to_geographic(sx + dx * sample_radius_m, sy + dy * sample_radius_m);
            sampler.sample(plon, plat)
        })
        .sum();
    sum / STENCIL.len() as f64
}

/// Min-max normalize raw station means into [0, 1].
/// A degenerate (all-equal) input maps every station to 0.
pub fn normalize_weights(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(RANGE_FLOOR);
    raw.iter().map(|&w| (w - min) / range).collect()
}

/// Per-station normalized raster weights, each the stencil mean at the
/// station's coordinate, min-max normalized across the whole station set.
pub fn estimate_station_weights(
    sampler: &RasterSampler,
    stations: &[Station],
    sample_radius_m: f64,
) -> Vec<f64> {
    let raw: Vec<f64> = stations.iter()
        .map(|station| stencil_mean(sampler, station.coord.x(), station.coord.y(), sample_radius_m))
        .collect();
    normalize_weights(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::tile::NoRaster;

    #[test]
    fn normalized_weights_span_unit_interval() {
        let normalized = normalize_weights(&[0.2, 0.8, 0.5]);
        assert_eq!(normalized[0], 0.0);
        assert!((normalized[1] - 1.0).abs() < 1e-12);
        assert!(normalized.iter().all(|&w| (0.0..=1.0).contains(&w)));
        assert!((normalized[2] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn all_equal_weights_collapse_to_zero() {
        let normalized = normalize_weights(&[0.4, 0.4, 0.4, 0.4]);
        assert!(normalized.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn stencil_mean_is_zero_without_raster() {
        let sampler = RasterSampler::new(Box::new(NoRaster), 14);
        assert_eq!(stencil_mean(&sampler, -79.383, 43.653, 600.0), 0.0);
    }

    #[test]
    fn stencil_mean_matches_constant_surface() {
        use crate::raster::sampler::tests::SolidSource;
        let sampler = RasterSampler::new(Box::new(SolidSource::new(255)), 14);
        let mean = stencil_mean(&sampler, -79.383, 43.653, 600.0);
        assert!((mean - 1.0).abs() < 1e-9);
    }
}
