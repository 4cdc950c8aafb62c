use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;
use crate::{
    Error,
    model::{BoundingBox, SpeedTable},
    projection::DEFAULT_PROJECTION,
};

/// Where road map data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapSource {
    /// OpenStreetMap protobuf extract
    Pbf { path: PathBuf },
    /// Saved Overpass API response in JSON output format
    OverpassJson { path: PathBuf },
}

/// Configuration for ingesting the multimodal graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub bbox: BoundingBox,
    pub map_source: Option<MapSource>,
    /// Directory with `stops.txt` and `stop_times.txt`
    pub gtfs_dir: Option<PathBuf>,
    pub ev_points: Option<PathBuf>,
    pub bike_hubs: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub batch_size: usize,
    /// Stations and road nodes closer than this get a pedestrian link
    pub walk_radius_m: f64,
    pub walking_speed_mps: f64,
    pub speeds: SpeedTable,
    pub projection_name: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bbox: BoundingBox::default(),
            map_source: None,
            gtfs_dir: None,
            ev_points: None,
            bike_hubs: None,
            retry: RetryPolicy::default(),
            batch_size: 5000,
            walk_radius_m: 500.0,
            walking_speed_mps: 1.4,
            speeds: SpeedTable::default(),
            projection_name: DEFAULT_PROJECTION.to_string(),
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.bbox.is_valid() {
            return Err(Error::InvalidConfig(format!(
                "Bounding box {:?} is not a valid south/west/north/east extent",
                self.bbox
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".into()));
        }
        if !is_positive(self.walk_radius_m) {
            return Err(Error::InvalidConfig(format!(
                "walk_radius_m must be positive, got {}",
                self.walk_radius_m
            )));
        }
        if !is_positive(self.walking_speed_mps) {
            return Err(Error::InvalidConfig(format!(
                "walking_speed_mps must be positive, got {}",
                self.walking_speed_mps
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::InvalidConfig("retry.max_attempts must be at least 1".into()));
        }
        if self.projection_name.trim().is_empty() {
            return Err(Error::InvalidConfig("projection_name must not be empty".into()));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
