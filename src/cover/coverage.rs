use geo::Coord;

use crate::cover::grid::GridIndex;

/// For each station, the demand indices within its radius. Outer index order
/// matches station order; demand indices are the set-cover universe.
pub type CoverageSet = Vec<Vec<usize>>;

/// Lower clamp on the weight-derived radius factor.
pub const MIN_RADIUS_FACTOR: f64 = 0.7;
/// Upper clamp on the weight-derived radius factor.
pub const MAX_RADIUS_FACTOR: f64 = 1.2;

/// Derive per-station radii from normalized weights: `base * (1 - lambda*w)`,
/// with the factor clamped to [0.7, 1.2] to bound coverage distortion.
pub fn radii_from_weights(base_radius: f64, weights: &[f64], lambda: f64) -> Vec<f64> {
    weights.iter()
        .map(|&w| base_radius * (1.0 - lambda * w).clamp(MIN_RADIUS_FACTOR, MAX_RADIUS_FACTOR))
        .collect()
}

/// Coverage lists under one shared radius.
pub fn precompute_coverage(
    stations: &[Coord<f64>],
    demand: &[Coord<f64>],
    radius_m: f64,
) -> CoverageSet {
    precompute_coverage_variable(stations, demand, &vec![radius_m; stations.len()])
}

/// Coverage lists under per-station radii.
///
/// The grid cell size is the maximum radius, which keeps the 3x3 neighborhood
/// query free of false negatives for every station; membership itself is the
/// exact squared-distance circle test.
pub fn precompute_coverage_variable(
    stations: &[Coord<f64>],
    demand: &[Coord<f64>],
    radii_m: &[f64],
) -> CoverageSet {
    assert_eq!(stations.len(), radii_m.len(), "one radius per station");

    let max_radius = radii_m.iter().copied().fold(0.0f64, f64::max);
    if stations.is_empty() || demand.is_empty() || max_radius <= 0.0 {
        return vec![Vec::new(); stations.len()];
    }

    let index = GridIndex::build(demand, max_radius);
    stations.iter().zip(radii_m)
        .map(|(station, &radius)| {
            let r2 = radius * radius;
            let mut covered: Vec<usize> = index.neighborhood(station.x, station.y)
                .filter(|&di| {
                    let dx = station.x - demand[di].x;
                    let dy = station.y - demand[di].y;
                    dx * dx + dy * dy <= r2
                })
                .collect();
            covered.sort_unstable();
            covered
        })
        .collect()
}
