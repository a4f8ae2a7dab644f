use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use spotmatch::api::{OsrmSnapper, RoadSnapper};
use spotmatch::config::{DirectionMode, FileConfig, SnappingConfig};
use spotmatch::domain::{MovementRecord, ParkingSpot};
use spotmatch::engine::{MatchRequest, apply_updates, process_request};
use spotmatch::import::{import_into, parse_bulk_import};
use spotmatch::repository::StreetSpots;
use spotmatch::{Movement, SpotCatalog};

/// Infer which parking spots vehicles occupied or vacated from GPS fixes
///
/// Examples:
///   # Load the bulk spot file into the catalog
///   spotmatch import parkingSpots.json
///
///   # Match registered cars against the spots passed by a moving car
///   spotmatch match request.json
///
///   # Same, using 10 degree heading sectors without writing anything
///   spotmatch --mode sector --sector-width 10 match request.json --dry-run
///
///   # Where did a car going from A to B most likely stop?
///   spotmatch target 56.1700 10.1879 56.1701 10.1880
#[derive(Parser, Debug)]
#[command(name = "spotmatch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches spotmatch.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Spot catalog JSON file (defaults to parking_catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Direction classification: cardinal or sector
    #[arg(long, global = true)]
    mode: Option<DirectionMode>,

    /// Heading sector width in degrees (must divide 360)
    #[arg(long, global = true)]
    sector_width: Option<u16>,

    /// Allowed heading difference in sectors between a movement and its candidates
    #[arg(long, global = true)]
    heading_tolerance: Option<u16>,

    /// Maximum distance in km between a projected stop and a matched spot
    #[arg(long, global = true)]
    threshold_km: Option<f64>,

    /// OSRM base URL used to snap fixes to roads before matching
    #[arg(long, global = true)]
    snap_url: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a bulk spot file ({"Street": [...]}) into the catalog
    Import { file: PathBuf },

    /// Print every spot in the catalog as JSON
    Spots,

    /// Flip the occupancy of one spot on a street
    Toggle {
        #[arg(long)]
        street: String,
        #[arg(long)]
        id: i64,
    },

    /// Print the projected stopping point of a movement
    Target(MovementArgs),

    /// Print the direction label of a movement
    Direction(MovementArgs),

    /// Match registered cars from a request file and update occupancy
    Match {
        request: PathBuf,

        /// Print the outcome without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(clap::Args, Debug)]
struct MovementArgs {
    #[arg(allow_hyphen_values = true)]
    old_lat: f64,
    #[arg(allow_hyphen_values = true)]
    old_lng: f64,
    #[arg(allow_hyphen_values = true)]
    new_lat: f64,
    #[arg(allow_hyphen_values = true)]
    new_lng: f64,
}

impl MovementArgs {
    fn movement(&self) -> Result<Movement> {
        let record = MovementRecord {
            old_lat: Some(self.old_lat),
            old_lng: Some(self.old_lng),
            new_lat: Some(self.new_lat),
            new_lng: Some(self.new_lng),
        };
        Ok(record.validate()?)
    }
}

#[derive(Serialize)]
struct CatalogListing {
    streets: BTreeMap<String, StreetSpots>,
    sectors: BTreeMap<u16, Vec<ParkingSpot>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let mut file_config = if let Some(ref config_path) = args.config {
        FileConfig::load_from(config_path)?
    } else {
        FileConfig::load().unwrap_or_default()
    };

    if let Some(mode) = args.mode {
        file_config.engine.mode = mode;
    }
    if let Some(width) = args.sector_width {
        file_config.engine.sector_width = width;
    }
    if let Some(tolerance) = args.heading_tolerance {
        file_config.engine.heading_tolerance = Some(tolerance);
    }
    if let Some(threshold) = args.threshold_km {
        file_config.engine.threshold_km = threshold;
    }
    if let Some(ref url) = args.snap_url {
        let snapping = file_config
            .snapping
            .get_or_insert_with(SnappingConfig::default);
        snapping.url = url.clone();
    }
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| file_config.catalog.clone());

    debug!("Configuration: {:?}", file_config);
    debug!("Catalog: {}", catalog_path.display());

    let settings = file_config
        .engine
        .settings()
        .context("Invalid engine configuration")?;

    match args.command {
        Command::Import { file } => {
            let contents = std::fs::read_to_string(&file)
                .context(format!("Failed to read spot file: {:?}", file))?;
            let import = parse_bulk_import(&contents)?;

            let mut catalog = SpotCatalog::load(&catalog_path)?;
            let summary = import_into(&mut catalog, &import);
            catalog.save(&catalog_path)?;

            info!(
                "Imported {} spots on {} streets ({} skipped)",
                summary.spots, summary.streets, summary.skipped
            );
        }

        Command::Spots => {
            let catalog = SpotCatalog::load(&catalog_path)?;
            let listing = CatalogListing {
                streets: catalog.listing(),
                sectors: catalog.sector_listing().clone(),
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }

        Command::Toggle { street, id } => {
            let mut catalog = SpotCatalog::load(&catalog_path)?;
            let occupied = catalog.toggle_spot(&street, id)?;
            catalog.save(&catalog_path)?;

            println!(
                "{}",
                serde_json::json!({
                    "message": "Parking spot updated successfully.",
                    "occupied": occupied,
                })
            );
        }

        Command::Target(movement) => {
            let movement = movement.movement()?;
            let target = settings.assigner.projector().project(&movement);
            println!("{}", serde_json::to_string_pretty(&target)?);
        }

        Command::Direction(movement) => {
            let movement = movement.movement()?;
            let direction = settings.strategy.classify(&movement);
            println!("{}", direction);
        }

        Command::Match { request, dry_run } => {
            let contents = std::fs::read_to_string(&request)
                .context(format!("Failed to read request file: {:?}", request))?;
            let request = MatchRequest::from_json(&contents)?;

            let snapper = match file_config.snapping {
                Some(ref snapping) if !snapping.url.is_empty() => {
                    Some(OsrmSnapper::new(snapping)?)
                }
                Some(_) => bail!("Road snapping is configured without a url"),
                None => None,
            };

            let mut catalog = SpotCatalog::load(&catalog_path)?;
            let outcome = process_request(
                &request,
                &settings,
                &catalog,
                snapper.as_ref().map(|s| s as &dyn RoadSnapper),
            )?;

            info!(
                "{} of {} registered cars matched among {} candidates in {}",
                outcome.matches.iter().filter(|m| m.is_matched()).count(),
                outcome.matches.len(),
                outcome.candidates.len(),
                outcome.partition
            );

            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if dry_run {
                info!("Dry run: {} updates not written", outcome.updates.len());
            } else {
                let applied = apply_updates(&mut catalog, &outcome.updates)?;
                catalog.save(&catalog_path)?;
                info!("Wrote {} occupancy updates", applied);
            }
        }
    }

    Ok(())
}
