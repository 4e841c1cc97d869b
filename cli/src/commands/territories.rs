use anyhow::Result;
use covplan::{TerritoryMetric, TerritoryParams};

use crate::cli::Metric;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::TerritoryArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or("./territories.geojson".into());

    println!("[territories] loading boundary from {}", args.boundary.display());
    println!("[territories] loading stations from {}", args.stations.display());
    let mut engine = super::build_engine(&args.boundary, &args.stations, &args.raster)?;

    let metric = match args.metric {
        Metric::Distance => TerritoryMetric::Distance,
        Metric::Weighted => TerritoryMetric::WeightedDistance,
    };
    let report = engine.run_territories(TerritoryParams {
        metric,
        cell_size_m: args.cell,
        lambda: args.lambda,
        shade: args.shade,
        ..TerritoryParams::default()
    })?;
    println!("[territories] {}", report.status);

    println!("[territories] writing territories to {}", out_path.display());
    super::write_geojson(
        out_path,
        &covplan::territories_to_geojson(&report.territories, engine.stations()),
    )
}
