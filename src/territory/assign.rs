use anyhow::{Result, bail};
use geo::{Centroid, Coord, LineString, MultiPolygon, Polygon};
use tracing::debug;

use crate::geometry;
use crate::model::{Station, Territory};
use crate::proj::{to_geographic, to_planar};
use crate::territory::shade::palette_color;

/// Station minimizing the weight-modulated distance
/// `dprime = d * (1 + lambda * w)` to a planar cell centroid.
/// Ties break toward the lowest station index; `None` only for no stations.
///
/// The formula is kept literal: a higher weight inflates a station's apparent
/// distance, so the unweighted station wins an otherwise equidistant cell.
pub fn best_station(
    centroid: Coord<f64>,
    stations: &[Coord<f64>],
    weights: &[f64],
    lambda: f64,
) -> Option<usize> {
    let mut best = None;
    let mut best_value = f64::INFINITY;
    for (j, station) in stations.iter().enumerate() {
        let distance = (centroid.x - station.x).hypot(centroid.y - station.y);
        let dprime = distance * (1.0 + lambda * weights[j]);
        if dprime < best_value {
            best_value = dprime;
            best = Some(j);
        }
    }
    best
}

/// Pure-distance territories: one bounded Voronoi cell per station, clipped
/// to the boundary. Cells that cannot be built or do not overlap the
/// boundary are skipped rather than failing the batch.
pub fn distance_territories(
    boundary: &MultiPolygon<f64>,
    stations: &[Station],
) -> Result<Vec<Territory>> {
    if stations.is_empty() {
        bail!("[territories] no stations available");
    }
    let Some(bounds) = geometry::planar_bounds(boundary) else {
        bail!("[territories] boundary has no extent");
    };

    let sites: Vec<Coord<f64>> = stations.iter().map(|s| s.planar()).collect();
    let cells = geometry::voronoi_cells(&sites, bounds);

    let mut territories = Vec::new();
    for (idx, cell) in cells.into_iter().enumerate() {
        let Some(cell) = cell else {
            debug!(station = idx, "voronoi cell degenerate; skipping");
            continue;
        };
        let Some(clipped) = geometry::intersect(&unproject(&cell), boundary) else {
            debug!(station = idx, "voronoi cell outside boundary; skipping");
            continue;
        };
        territories.push(Territory {
            station: idx,
            geometry: clipped,
            mean_weight: None,
            color: palette_color(idx),
        });
    }
    Ok(territories)
}

/// Weight-modulated territories: tessellate the boundary into hex cells,
/// assign each cell centroid to the station minimizing the modulated
/// distance, then dissolve same-owner cells into one polygon per station.
pub fn weighted_territories(
    boundary: &MultiPolygon<f64>,
    stations: &[Station],
    weights: &[f64],
    lambda: f64,
    cell_size_m: f64,
) -> Result<Vec<Territory>> {
    if stations.is_empty() {
        bail!("[territories] no stations available");
    }
    assert_eq!(stations.len(), weights.len(), "one weight per station");

    let cells = geometry::hex_grid(boundary, cell_size_m);
    if cells.is_empty() {
        bail!("[territories] no assignment cells within boundary");
    }

    let sites: Vec<Coord<f64>> = stations.iter().map(|s| s.planar()).collect();
    let mut groups: Vec<Vec<MultiPolygon<f64>>> = vec![Vec::new(); stations.len()];
    for cell in cells {
        let Some(centroid) = cell.centroid() else { continue };
        let (cx, cy) = to_planar(centroid.x(), centroid.y());
        let Some(owner) = best_station(Coord { x: cx, y: cy }, &sites, weights, lambda) else {
            continue;
        };
        groups[owner].push(MultiPolygon(vec![cell]));
    }

    let mut territories = Vec::new();
    for (idx, group) in groups.into_iter().enumerate() {
        let Some(dissolved) = geometry::union_all(group) else { continue };
        territories.push(Territory {
            station: idx,
            geometry: dissolved,
            mean_weight: None,
            color: palette_color(idx),
        });
    }
    Ok(territories)
}

/// Back-project a planar polygon to geographic coordinates.
fn unproject(polygon: &Polygon<f64>) -> MultiPolygon<f64> {
    let ring: Vec<Coord<f64>> = polygon.exterior().0.iter()
        .map(|c| {
            let (lon, lat) = to_geographic(c.x, c.y);
            Coord { x: lon, y: lat }
        })
        .collect();
    MultiPolygon(vec![Polygon::new(LineString(ring), vec![])])
}
