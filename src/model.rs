//! Plain data model shared by the coverage and territory pipelines.

use geo::{Coord, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

use crate::proj::to_planar;

/// Demand-grid spacing floor (meters).
pub const MIN_GRID_SPACING_M: f64 = 50.0;
/// Territory cell-size floor (meters).
pub const MIN_CELL_SIZE_M: f64 = 200.0;
/// Territory cell-size cap for the weight-modulated metric (meters).
pub const MAX_WEIGHTED_CELL_SIZE_M: f64 = 300.0;

/// A candidate station location.
#[derive(Clone, Debug)]
pub struct Station {
    pub id: String,
    /// Geographic coordinate (lon, lat in WGS84 degrees).
    pub coord: Point<f64>,
    /// Normalized raster weight in [0, 1]; unset until estimated.
    pub weight: Option<f64>,
    /// Coverage radius in meters.
    pub radius: f64,
}

impl Station {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self { id: id.into(), coord: Point::new(lon, lat), weight: None, radius: 0.0 }
    }

    /// Planar (Web Mercator meters) coordinate of the station.
    #[inline]
    pub fn planar(&self) -> Coord<f64> {
        let (x, y) = to_planar(self.coord.x(), self.coord.y());
        Coord { x, y }
    }
}

/// One unit of coverage need, generated from the masked demand grid.
/// Indices form a dense 0..N-1 range and serve as set-cover universe elements.
#[derive(Clone, Debug)]
pub struct DemandPoint {
    pub idx: usize,
    /// Geographic coordinate (lon, lat).
    pub coord: Point<f64>,
    /// Planar coordinate (meters), computed once at grid build time.
    pub planar: Coord<f64>,
    /// Unit demand weight; fixed at 1 in this design.
    pub weight: f64,
}

/// A dissolved per-station service territory.
#[derive(Clone, Debug)]
pub struct Territory {
    /// Index of the owning station.
    pub station: usize,
    pub geometry: MultiPolygon<f64>,
    /// Mean raster weight over grid samples inside the territory, if shaded.
    pub mean_weight: Option<f64>,
    /// CSS-style display color.
    pub color: String,
}

/// Parameters for a set-cover run. Values are clamped, not rejected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoverParams {
    /// Base coverage radius in meters.
    pub base_radius_m: f64,
    /// Demand-grid spacing in meters.
    pub grid_spacing_m: f64,
    /// Weight-modulation factor; `Some` selects variable radii derived from
    /// the raster weight surface, `None` a fixed shared radius.
    pub lambda: Option<f64>,
    /// Planar offset of the per-station sampling stencil in meters.
    pub sample_radius_m: f64,
}

impl Default for CoverParams {
    fn default() -> Self {
        Self {
            base_radius_m: 480.0,
            grid_spacing_m: 400.0,
            lambda: None,
            sample_radius_m: crate::raster::DEFAULT_SAMPLE_RADIUS_M,
        }
    }
}

impl CoverParams {
    /// Clamp parameters to their valid ranges.
    pub fn clamped(mut self) -> Self {
        self.base_radius_m = self.base_radius_m.max(1.0);
        self.grid_spacing_m = self.grid_spacing_m.max(MIN_GRID_SPACING_M);
        self.sample_radius_m = self.sample_radius_m.max(0.0);
        self
    }
}

/// Distance metric for territory assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryMetric {
    /// Pure planar distance (classic Voronoi).
    Distance,
    /// Distance modulated by the station's raster weight:
    /// `d * (1 + lambda * w)`.
    WeightedDistance,
}

/// Parameters for a territory-assignment run. Values are clamped, not rejected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerritoryParams {
    pub metric: TerritoryMetric,
    /// Assignment/shading cell size in meters.
    pub cell_size_m: f64,
    /// Weight-modulation factor (weighted metric only).
    pub lambda: f64,
    /// Shade territories by the raster weight surface.
    pub shade: bool,
    /// Planar offset of the per-station sampling stencil in meters.
    pub sample_radius_m: f64,
}

impl Default for TerritoryParams {
    fn default() -> Self {
        Self {
            metric: TerritoryMetric::Distance,
            cell_size_m: 600.0,
            lambda: 0.6,
            shade: false,
            sample_radius_m: crate::raster::DEFAULT_SAMPLE_RADIUS_M,
        }
    }
}

impl TerritoryParams {
    /// Clamp parameters to their valid ranges; the weighted metric further
    /// caps the cell size so assignment stays fine-grained.
    pub fn clamped(mut self) -> Self {
        self.cell_size_m = self.cell_size_m.max(MIN_CELL_SIZE_M);
        if self.metric == TerritoryMetric::WeightedDistance {
            self.cell_size_m = self.cell_size_m.min(MAX_WEIGHTED_CELL_SIZE_M);
        }
        self.sample_radius_m = self.sample_radius_m.max(0.0);
        self
    }
}

/// Outcome of a set-cover run, as plain data for the presentation layer.
#[derive(Clone, Debug)]
pub struct CoverReport {
    /// Selected station indices, in selection order.
    pub selected: Vec<usize>,
    pub covered_count: usize,
    pub total: usize,
    /// Radius used per station (uniform unless weight-derived).
    pub radii: Vec<f64>,
    /// Circular coverage buffer per selected station.
    pub buffers: Vec<MultiPolygon<f64>>,
    /// Union of the buffers clipped to the boundary, when computable.
    pub coverage: Option<MultiPolygon<f64>>,
    pub status: String,
}

impl CoverReport {
    /// Fraction of demand points covered, in [0, 1].
    pub fn covered_fraction(&self) -> f64 {
        self.covered_count as f64 / self.total.max(1) as f64
    }
}

/// Outcome of a territory-assignment run.
#[derive(Clone, Debug)]
pub struct TerritoryReport {
    pub territories: Vec<Territory>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_params_clamp_floors() {
        let params = CoverParams {
            base_radius_m: 0.0,
            grid_spacing_m: 10.0,
            lambda: None,
            sample_radius_m: -5.0,
        }
        .clamped();
        assert_eq!(params.base_radius_m, 1.0);
        assert_eq!(params.grid_spacing_m, MIN_GRID_SPACING_M);
        assert_eq!(params.sample_radius_m, 0.0);
    }

    #[test]
    fn weighted_metric_caps_cell_size() {
        let params = TerritoryParams {
            metric: TerritoryMetric::WeightedDistance,
            cell_size_m: 600.0,
            ..TerritoryParams::default()
        }
        .clamped();
        assert_eq!(params.cell_size_m, MAX_WEIGHTED_CELL_SIZE_M);

        let params = TerritoryParams {
            metric: TerritoryMetric::Distance,
            cell_size_m: 600.0,
            ..TerritoryParams::default()
        }
        .clamped();
        assert_eq!(params.cell_size_m, 600.0);

        let params = TerritoryParams { cell_size_m: 80.0, ..TerritoryParams::default() }.clamped();
        assert_eq!(params.cell_size_m, MIN_CELL_SIZE_M);
    }

    #[test]
    fn station_planar_round_trips() {
        let station = Station::new("A", -79.383, 43.653);
        let planar = station.planar();
        let (lon, lat) = crate::proj::to_geographic(planar.x, planar.y);
        assert!((lon - -79.383).abs() < 1e-6);
        assert!((lat - 43.653).abs() < 1e-6);
    }
}
