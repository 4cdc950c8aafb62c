//! Road map data providers

mod overpass;
mod pbf;

use geo::Point;
use hashbrown::{HashMap, HashSet};

pub use overpass::OverpassJsonSource;
pub use pbf::PbfMapSource;

use crate::{Error, model::BoundingBox};

/// Way carrying a `highway` classification
#[derive(Debug, Clone, PartialEq)]
pub struct OsmWay {
    pub id: i64,
    pub highway: String,
    pub nodes: Vec<i64>,
}

/// Road geometry for a bounding box
#[derive(Debug, Clone, Default)]
pub struct MapData {
    /// Node id to location, x = lon, y = lat
    pub nodes: HashMap<i64, Point<f64>>,
    pub ways: Vec<OsmWay>,
}

impl MapData {
    /// Drops nodes no way refers to
    pub(crate) fn retain_way_nodes(&mut self) {
        let referenced: HashSet<i64> = self
            .ways
            .iter()
            .flat_map(|way| way.nodes.iter().copied())
            .collect();
        self.nodes.retain(|id, _| referenced.contains(id));
    }
}

/// Capability to fetch tagged road geometry for a bounding box.
/// Fetches may fail transiently and are retried by the caller.
pub trait MapDataProvider: Send + Sync {
    /// Human readable source name for logs and errors
    fn name(&self) -> String;

    fn fetch(&self, bbox: &BoundingBox) -> Result<MapData, Error>;
}
