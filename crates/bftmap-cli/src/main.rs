mod area;
mod nearby;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bftmap-cli")]
#[command(about = "Barrier-free toilet lookup for Tokyo")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the nearest barrier-free toilets around a point
    Nearby {
        /// Latitude of the search center
        #[arg(long)]
        lat: f64,
        /// Longitude of the search center
        #[arg(long)]
        lng: f64,
        /// Search radius in meters (defaults to BFTMAP_DEFAULT_RADIUS_METERS)
        #[arg(long)]
        radius: Option<f64>,
        /// Maximum number of results (defaults to BFTMAP_DEFAULT_MAX_COUNT)
        #[arg(long)]
        limit: Option<usize>,
        /// Skip the area cascade and scan the integrated files
        #[arg(long)]
        integrated: bool,
        /// Print the resolution as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show which area a coordinate or an address falls in
    Classify {
        #[arg(long, requires = "lng", conflicts_with = "address")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
        /// Free-text address, e.g. "東京都 新宿区西新宿2-8-1"
        #[arg(long, required_unless_present = "lat")]
        address: Option<String>,
    },
    /// List the areas a search expands into from the named area
    Adjacent {
        /// Municipality name, e.g. 世田谷区
        #[arg(long)]
        area: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = bftmap_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Nearby {
            lat,
            lng,
            radius,
            limit,
            integrated,
            json,
        }) => {
            let args = nearby::NearbyArgs {
                lat,
                lng,
                radius_meters: radius.unwrap_or(config.default_radius_meters),
                max_count: limit.unwrap_or(config.default_max_count),
                integrated,
                json,
            };
            nearby::run_nearby(&config, args).await?;
        }
        Some(Commands::Classify { lat, lng, address }) => match (lat, lng, address) {
            (Some(lat), Some(lng), _) => area::run_classify_point(lat, lng),
            (_, _, Some(address)) => area::run_classify_address(&address),
            _ => anyhow::bail!("classify needs --lat and --lng, or --address"),
        },
        Some(Commands::Adjacent { area }) => area::run_adjacent(&area)?,
        None => println!("bftmap-cli ready; try `bftmap-cli nearby --lat 35.681 --lng 139.767`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
