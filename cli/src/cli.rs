use std::path::PathBuf;

/// Species range reconciliation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "rangelayers", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file (RANGELAYERS_* environment variables apply on top)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory for downloaded boundary archives, defaults to "./.rangelayers-cache"
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or(".rangelayers-cache".into())
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Reconcile points with clipped range maps and write the layer document
    Run(RunArgs),

    /// Download the boundary collection into the cache
    FetchBoundary(FetchArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Observation point table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// Range polygons (.shp, .geojson, or .zip with one shapefile)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub ranges: PathBuf,

    /// Output layer document, defaults to "./layers.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Boundary collection URL or path (overrides config)
    #[arg(long)]
    pub boundary: Option<String>,

    /// Exact jurisdiction name in the boundary collection (overrides config)
    #[arg(short, long)]
    pub jurisdiction: Option<String>,

    /// Native CRS of the range data, e.g. EPSG:4269 (overrides .prj and config)
    #[arg(long)]
    pub range_crs: Option<String>,

    /// Overwrite an existing output file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Boundary archive URL, defaults to the configured source
    pub url: Option<String>,
}
