use geo::{Contains, MultiPolygon, Point};
use rayon::prelude::*;

use crate::geometry::{self, TerritoryIndex};
use crate::model::Territory;
use crate::raster::RasterSampler;

/// Range floor guarding the percentile window against an all-equal input.
const RANGE_FLOOR: f64 = 1e-6;

/// Lower percentile of the color window.
const CLIP_LOW: f64 = 0.02;
/// Upper percentile of the color window.
const CLIP_HIGH: f64 = 0.98;

/// Linear-interpolation percentile of `values` at `p` in [0, 1].
/// For sorted values, index `k = (n-1)*p`; the result interpolates between
/// the neighbors of `k`. Empty input yields 0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let k = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let floor = k.floor() as usize;
    let ceil = k.ceil() as usize;
    if floor == ceil {
        return sorted[floor];
    }
    sorted[floor] + (k - floor as f64) * (sorted[ceil] - sorted[floor])
}

/// Map t in [0, 1] onto a turbo-like perceptually-ordered ramp.
pub fn turbo_color(t: f64) -> String {
    let channel = |base: f64, scale: f64, phase: f64| {
        (255.0 * (base + scale * (5.1 * t + phase).sin()).clamp(0.0, 1.0)).round() as u8
    };
    let r = channel(1.0, 0.5, 1.7);
    let g = channel(0.5, 0.5, -0.5);
    let b = channel(0.2, 0.8, -2.8);
    format!("rgb({r},{g},{b})")
}

/// Deterministic categorical color for station `i` from a 12-hue wheel.
pub fn palette_color(i: usize) -> String {
    const HUES: [u16; 12] = [10, 35, 55, 80, 110, 140, 170, 200, 230, 260, 290, 320];
    format!("hsl({},70%,70%)", HUES[i % HUES.len()])
}

/// Shade territories by the raster weight surface.
///
/// Samples a masked point grid over the boundary at `spacing_m` (fanned out
/// in parallel; samples are pure functions of coordinate), averages the
/// samples falling inside each territory, clips the means to the
/// [2nd, 98th] percentile window, and maps the clipped value onto the ramp.
/// An all-equal set of means maps every territory to one color.
pub fn shade_territories(
    sampler: &RasterSampler,
    boundary: &MultiPolygon<f64>,
    territories: &mut [Territory],
    spacing_m: f64,
) {
    if territories.is_empty() {
        return;
    }

    let grid = geometry::point_grid(boundary, spacing_m);
    let samples: Vec<(Point<f64>, f64)> = grid.par_iter()
        .map(|point| (*point, sampler.sample(point.x(), point.y())))
        .collect();

    let shapes: Vec<MultiPolygon<f64>> =
        territories.iter().map(|t| t.geometry.clone()).collect();
    let index = TerritoryIndex::new(&shapes);

    let mut sums = vec![0.0f64; territories.len()];
    let mut counts = vec![0usize; territories.len()];
    for &(point, weight) in &samples {
        for idx in index.candidates(point) {
            if shapes[idx].contains(&point) {
                sums[idx] += weight;
                counts[idx] += 1;
            }
        }
    }

    let means: Vec<f64> = sums.iter().zip(&counts)
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();

    let low = percentile(&means, CLIP_LOW);
    let high = percentile(&means, CLIP_HIGH);
    let range = (high - low).max(RANGE_FLOOR);

    for (territory, &mean) in territories.iter_mut().zip(&means) {
        territory.mean_weight = Some(mean);
        let t = ((mean - low) / range).clamp(0.0, 1.0);
        territory.color = turbo_color(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geometry::tests::planar_square;
    use crate::model::Territory;
    use crate::raster::{NoRaster, RasterSampler};

    #[test]
    fn percentile_endpoints_are_min_and_max() {
        let values = vec![0.9, 0.1, 0.5, 0.3, 0.7];
        assert_eq!(percentile(&values, 0.0), 0.1);
        assert_eq!(percentile(&values, 1.0), 0.9);
    }

    #[test]
    fn percentile_is_monotonic_in_p() {
        let values = vec![0.2, 0.8, 0.4, 0.6, 0.1, 0.9];
        let mut previous = f64::NEG_INFINITY;
        for i in 0..=20 {
            let value = percentile(&values, i as f64 / 20.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        // Sorted: [0, 10]; p=0.5 lands halfway.
        assert_eq!(percentile(&[10.0, 0.0], 0.5), 5.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn turbo_is_deterministic_and_css_shaped() {
        assert_eq!(turbo_color(0.3), turbo_color(0.3));
        assert!(turbo_color(0.0).starts_with("rgb("));
        assert_ne!(turbo_color(0.0), turbo_color(1.0));
    }

    #[test]
    fn palette_cycles_over_twelve_hues() {
        assert_eq!(palette_color(0), palette_color(12));
        assert_ne!(palette_color(0), palette_color(1));
    }

    fn make_territories() -> Vec<Territory> {
        vec![
            Territory {
                station: 0,
                geometry: planar_square(0.0, 1000.0),
                mean_weight: None,
                color: String::new(),
            },
            Territory {
                station: 1,
                geometry: planar_square(1000.0, 2000.0),
                mean_weight: None,
                color: String::new(),
            },
        ]
    }

    #[test]
    fn absent_raster_shades_all_territories_alike() {
        let sampler = RasterSampler::new(Box::new(NoRaster), 14);
        let boundary = planar_square(0.0, 2000.0);
        let mut territories = make_territories();

        shade_territories(&sampler, &boundary, &mut territories, 200.0);

        assert_eq!(territories[0].mean_weight, Some(0.0));
        assert_eq!(territories[1].mean_weight, Some(0.0));
        // Degenerate all-equal means: one representative color, no div-by-zero.
        assert_eq!(territories[0].color, territories[1].color);
    }

    #[test]
    fn constant_surface_yields_equal_means() {
        use crate::raster::sampler::tests::SolidSource;
        let sampler = RasterSampler::new(Box::new(SolidSource::new(255)), 14);
        let boundary = planar_square(0.0, 2000.0);
        let mut territories = make_territories();

        shade_territories(&sampler, &boundary, &mut territories, 200.0);

        let a = territories[0].mean_weight.unwrap();
        let b = territories[1].mean_weight.unwrap();
        assert!((a - 1.0).abs() < 1e-9);
        assert!((b - 1.0).abs() < 1e-9);
        assert_eq!(territories[0].color, territories[1].color);
    }
}
