use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use transitweave_core::{
    loading::{IngestionPipeline, apply_delay_updates, read_delay_updates},
    model::AmenityKind,
    projection::{ProjectionCatalog, ProjectionManager, ProjectionSpec},
    routing::{AStarOracle, RouteQueryEngine, TravelMode},
    store::{GraphStore, MemoryGraphStore},
};

use crate::{AppError, config::AppConfig};

/// Multimodal trip planner over roads, transit schedules and amenities
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file, defaults to ./transitweave.toml when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Builds the graph from the configured sources if the store is empty
    Ingest,
    /// Finds a route between two coordinates
    Route {
        /// Start as LAT,LON
        #[arg(long, value_parser = parse_lat_lon)]
        from: (f64, f64),
        /// Destination as LAT,LON
        #[arg(long, value_parser = parse_lat_lon)]
        to: (f64, f64),
        /// transit, walk or drive; anything else drives
        #[arg(long, default_value = "transit")]
        mode: String,
        /// Print a GeoJSON FeatureCollection instead of the itinerary
        #[arg(long)]
        geojson: bool,
    },
    /// Lists all transit stations
    Stations,
    /// Prints the extent of the road network
    Bounds,
    /// Prints node and edge counts
    Stats,
    /// Lists amenity points
    Amenities {
        /// ev or bike
        #[arg(long)]
        kind: Option<AmenityKind>,
        /// Only amenities within the configured radius of LAT,LON
        #[arg(long, value_parser = parse_lat_lon)]
        near: Option<(f64, f64)>,
    },
    /// Applies the stop delays of a binary GTFS-Realtime trip updates feed
    Delays { file: PathBuf },
}

pub fn parse_lat_lon(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{s}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("invalid longitude '{lon}': {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinate out of range: {lat},{lon}"));
    }
    Ok((lat, lon))
}

/// Runs one command, printing its result as JSON on stdout
pub fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::resolve(cli.config.as_deref())?;
    let app = App::open(&config)?;

    match cli.command {
        Command::Ingest => {
            let report = IngestionPipeline::new(config.ingest.clone(), app.store.clone(), app.projection.clone())?
                .ensure_ingested()?;
            if report.ingested {
                app.store.save(&config.store.path)?;
                info!("Saved graph to {}", config.store.path.display());
            }
            print_json(&report)
        }
        Command::Route {
            from,
            to,
            mode,
            geojson,
        } => {
            let mode = TravelMode::from_name(&mode);
            let itinerary = app.engine(&config).find_path(from.0, from.1, to.0, to.1, mode)?;
            if geojson {
                println!("{}", itinerary.to_geojson_string()?);
                Ok(())
            } else {
                print_json(&itinerary)
            }
        }
        Command::Stations => print_json(&app.store.stations()?),
        Command::Bounds => print_json(&app.store.road_bounds()?),
        Command::Stats => print_json(&app.store.stats()?),
        Command::Amenities { kind, near } => {
            let amenities = match near {
                Some((lat, lon)) => app.engine(&config).amenities_near(
                    kind,
                    lat,
                    lon,
                    config.query.amenity_radius_m,
                )?,
                None => app.store.amenities(kind)?,
            };
            print_json(&amenities)
        }
        Command::Delays { file } => {
            let updates = read_delay_updates(&file)?;
            let touched = apply_delay_updates(app.store.as_ref(), &updates)?;
            app.store.save(&config.store.path)?;
            print_json(&serde_json::json!({ "updates": updates.len(), "matched": touched }))
        }
    }
}

/// Store and projection wiring shared by every command
struct App {
    store: Arc<MemoryGraphStore>,
    catalog: Arc<ProjectionCatalog>,
    projection: Arc<ProjectionManager>,
}

impl App {
    fn open(config: &AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(open_store(&config.store.path)?);
        let catalog = Arc::new(ProjectionCatalog::new());
        let projection = Arc::new(ProjectionManager::new(
            config.ingest.projection_name.clone(),
            ProjectionSpec::multimodal(),
            store.clone(),
            catalog.clone(),
        ));
        Ok(Self {
            store,
            catalog,
            projection,
        })
    }

    fn engine(&self, config: &AppConfig) -> RouteQueryEngine {
        let oracle = Arc::new(AStarOracle::for_speeds(
            self.catalog.clone(),
            &config.ingest.speeds,
            config.ingest.walking_speed_mps,
        ));
        RouteQueryEngine::new(self.store.clone(), oracle, self.projection.clone())
    }
}

fn open_store(path: &Path) -> Result<MemoryGraphStore, AppError> {
    if path.exists() {
        info!("Loading graph from {}", path.display());
        Ok(MemoryGraphStore::load(path)?)
    } else {
        info!("No graph at {}, starting with an empty store", path.display());
        Ok(MemoryGraphStore::new())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
