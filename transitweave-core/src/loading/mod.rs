//! This module is responsible for loading data from various sources (OSM,
//! GTFS, amenity tables) into the graph store.

mod amenities;
mod builder;
mod config;
pub mod gtfs;
pub mod osm;
mod realtime;
mod retry;
mod road;
mod transfers;

pub use amenities::load_amenities;
pub use builder::{IngestReport, IngestionPipeline};
pub use config::{IngestConfig, MapSource};
pub use realtime::{apply_delay_updates, decode_delay_feed, read_delay_updates};
pub use retry::RetryPolicy;
pub use road::{RoadBuildSummary, RoadNetworkBuilder};
