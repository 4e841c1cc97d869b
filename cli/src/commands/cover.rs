use anyhow::Result;
use covplan::CoverParams;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CoverArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or("./cover.geojson".into());

    println!("[cover] loading boundary from {}", args.boundary.display());
    println!("[cover] loading stations from {}", args.stations.display());
    let mut engine = super::build_engine(&args.boundary, &args.stations, &args.raster)?;

    let report = engine.run_set_cover(CoverParams {
        base_radius_m: args.radius,
        grid_spacing_m: args.spacing,
        lambda: args.lambda,
        ..CoverParams::default()
    })?;
    println!("[cover] {}", report.status);

    println!("[cover] writing report to {}", out_path.display());
    super::write_geojson(out_path, &covplan::cover_report_to_geojson(&report, engine.stations()))
}
