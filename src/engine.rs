//! Orchestration of the two engine operations: station set cover and
//! territory assignment. Inputs are validated here; everything downstream is
//! the absorb-and-continue behavior of the individual components.

use anyhow::{Result, bail};
use geo::{Coord, MultiPolygon};
use tracing::info;

use crate::cover::{precompute_coverage_variable, radii_from_weights, solve};
use crate::geometry;
use crate::model::{
    CoverParams, CoverReport, DemandPoint, Station, TerritoryMetric, TerritoryParams,
    TerritoryReport,
};
use crate::proj::to_planar;
use crate::raster::{RasterSampler, estimate_station_weights};
use crate::territory::{distance_territories, shade_territories, weighted_territories};

/// The coverage and territory-assignment engine. Owns the boundary, the
/// station set, and the raster sampler with its caches for the run lifetime.
pub struct Engine {
    boundary: MultiPolygon<f64>,
    stations: Vec<Station>,
    sampler: RasterSampler,
}

impl Engine {
    pub fn new(boundary: MultiPolygon<f64>, stations: Vec<Station>, sampler: RasterSampler) -> Self {
        Self { boundary, stations, sampler }
    }

    #[inline]
    pub fn boundary(&self) -> &MultiPolygon<f64> { &self.boundary }

    #[inline]
    pub fn stations(&self) -> &[Station] { &self.stations }

    #[inline]
    pub fn sampler(&self) -> &RasterSampler { &self.sampler }

    /// Generate the demand universe: a masked point grid over the boundary,
    /// indexed densely from 0, each point carrying unit weight.
    pub fn build_demand_points(&self, spacing_m: f64) -> Vec<DemandPoint> {
        geometry::point_grid(&self.boundary, spacing_m).into_iter().enumerate()
            .map(|(idx, coord)| {
                let (x, y) = to_planar(coord.x(), coord.y());
                DemandPoint { idx, coord, planar: Coord { x, y }, weight: 1.0 }
            })
            .collect()
    }

    /// Select a minimal station subset covering the demand grid.
    pub fn run_set_cover(&mut self, params: CoverParams) -> Result<CoverReport> {
        let params = params.clamped();
        self.require_inputs()?;

        let demand = self.build_demand_points(params.grid_spacing_m);
        if demand.is_empty() {
            bail!("[set_cover] no demand points inside the boundary");
        }
        info!(points = demand.len(), spacing = params.grid_spacing_m, "built demand grid");

        let radii = match params.lambda {
            Some(lambda) => {
                info!("estimating per-station raster weights");
                let weights =
                    estimate_station_weights(&self.sampler, &self.stations, params.sample_radius_m);
                for (station, &weight) in self.stations.iter_mut().zip(&weights) {
                    station.weight = Some(weight);
                }
                radii_from_weights(params.base_radius_m, &weights, lambda)
            }
            None => vec![params.base_radius_m; self.stations.len()],
        };
        for (station, &radius) in self.stations.iter_mut().zip(&radii) {
            station.radius = radius;
        }

        let station_coords: Vec<Coord<f64>> = self.stations.iter().map(|s| s.planar()).collect();
        let demand_coords: Vec<Coord<f64>> = demand.iter().map(|d| d.planar).collect();
        let coverage = precompute_coverage_variable(&station_coords, &demand_coords, &radii);
        let outcome = solve(demand.len(), &coverage);

        let buffers: Vec<MultiPolygon<f64>> = outcome.selected.iter()
            .map(|&s| MultiPolygon(vec![geometry::circle(self.stations[s].coord, radii[s])]))
            .collect();
        let coverage_union = geometry::union_all(buffers.iter().cloned())
            .map(|unioned| geometry::intersect(&unioned, &self.boundary).unwrap_or(unioned));

        let covered_pct = 100.0 * outcome.covered_count as f64 / outcome.total.max(1) as f64;
        let status = format!(
            "Set cover: {} station(s), {covered_pct:.1}% of {} demand points covered.",
            outcome.selected.len(),
            outcome.total,
        );
        info!(selected = outcome.selected.len(), covered_pct, "set cover finished");

        Ok(CoverReport {
            selected: outcome.selected,
            covered_count: outcome.covered_count,
            total: outcome.total,
            radii,
            buffers,
            coverage: coverage_union,
            status,
        })
    }

    /// Partition the boundary into per-station territories.
    pub fn run_territories(&mut self, params: TerritoryParams) -> Result<TerritoryReport> {
        let params = params.clamped();
        self.require_inputs()?;

        let mut territories = match params.metric {
            TerritoryMetric::Distance => distance_territories(&self.boundary, &self.stations)?,
            TerritoryMetric::WeightedDistance => {
                info!("estimating per-station raster weights");
                let weights =
                    estimate_station_weights(&self.sampler, &self.stations, params.sample_radius_m);
                for (station, &weight) in self.stations.iter_mut().zip(&weights) {
                    station.weight = Some(weight);
                }
                weighted_territories(
                    &self.boundary,
                    &self.stations,
                    &weights,
                    params.lambda,
                    params.cell_size_m,
                )?
            }
        };

        if params.shade {
            info!(cells = territories.len(), "shading territories by raster");
            shade_territories(&self.sampler, &self.boundary, &mut territories, params.cell_size_m);
        }

        let status = format!(
            "Built {} territor{} ({}{}).",
            territories.len(),
            if territories.len() == 1 { "y" } else { "ies" },
            match params.metric {
                TerritoryMetric::Distance => "distance",
                TerritoryMetric::WeightedDistance => "weighted distance",
            },
            if params.shade { ", raster-shaded" } else { "" },
        );
        info!(territories = territories.len(), "territory assignment finished");

        Ok(TerritoryReport { territories, status })
    }

    /// Missing-input check shared by both operations: abort with a
    /// descriptive status, leaving prior outputs untouched.
    fn require_inputs(&self) -> Result<()> {
        if self.boundary.0.is_empty() {
            bail!("[engine] no boundary loaded");
        }
        if self.stations.is_empty() {
            bail!("[engine] no stations loaded");
        }
        Ok(())
    }
}
