use std::path::PathBuf;

/// Coverage-planning CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "covplan", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Select a minimal station subset covering the demand region
    Cover(CoverArgs),

    /// Partition the demand region into per-station territories
    Territories(TerritoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct RasterArgs {
    /// Directory holding a {z}/{x}/{y}.png tile pyramid
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub tiles: Option<PathBuf>,

    /// Tile URL template with {z}, {x}, {y} placeholders
    #[cfg(feature = "fetch")]
    #[arg(long, conflicts_with = "tiles")]
    pub tile_url: Option<String>,

    /// Sampling zoom level (clamped to the supported range)
    #[arg(long, default_value_t = 14)]
    pub zoom: u8,
}

#[derive(clap::Args, Debug)]
pub struct CoverArgs {
    /// Boundary GeoJSON (Polygon/MultiPolygon features)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub boundary: PathBuf,

    /// Station GeoJSON (Point/MultiPoint features)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub stations: PathBuf,

    /// Base coverage radius in meters
    #[arg(short, long, default_value_t = 480.0)]
    pub radius: f64,

    /// Demand-grid spacing in meters
    #[arg(short, long, default_value_t = 400.0)]
    pub spacing: f64,

    /// Derive per-station radii from the raster with this modulation factor
    #[arg(short, long)]
    pub lambda: Option<f64>,

    #[command(flatten)]
    pub raster: RasterArgs,

    /// Output GeoJSON file, defaults to "./cover.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct TerritoryArgs {
    /// Boundary GeoJSON (Polygon/MultiPolygon features)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub boundary: PathBuf,

    /// Station GeoJSON (Point/MultiPoint features)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub stations: PathBuf,

    /// Assignment metric
    #[arg(short, long, value_enum, default_value_t = Metric::Distance)]
    pub metric: Metric,

    /// Assignment/shading cell size in meters
    #[arg(short, long, default_value_t = 600.0)]
    pub cell: f64,

    /// Weight-modulation factor (weighted metric only)
    #[arg(short, long, default_value_t = 0.6)]
    pub lambda: f64,

    /// Shade territories by the raster weight surface
    #[arg(long)]
    pub shade: bool,

    #[command(flatten)]
    pub raster: RasterArgs,

    /// Output GeoJSON file, defaults to "./territories.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Metric {
    Distance,
    Weighted,
}
