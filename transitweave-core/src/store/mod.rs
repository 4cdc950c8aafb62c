//! Property graph store
//!
//! Every write is an upsert keyed on the record's identity, so replaying an
//! ingestion run against unchanged sources leaves the graph untouched.

mod memory;
mod spatial;

use geo::Point;
use serde::Serialize;

pub use memory::MemoryGraphStore;

use crate::{
    Error, Time,
    model::{
        Amenity, AmenityKind, DelayUpdate, EdgeKind, GraphBounds, NodeKey, RoadNode, RoadSegment,
        Station, TripEvent, WalkLink,
    },
    projection::ProjectionSpec,
};

/// Road node matched to a coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub node_id: String,
    pub point: Point<f64>,
    /// Great-circle distance from the query coordinate, meters
    pub distance: f64,
}

/// Node and edge counts per family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub road_nodes: usize,
    pub road_segments: usize,
    pub stations: usize,
    pub trip_events: usize,
    pub event_links: usize,
    pub walk_links: usize,
    pub amenities: usize,
}

impl GraphStats {
    /// No routable node has been written yet
    pub fn is_empty(&self) -> bool {
        self.road_nodes == 0 && self.stations == 0 && self.trip_events == 0
    }
}

/// Node as seen by a projection
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotNode {
    pub key: NodeKey,
    pub point: Point<f64>,
    /// Present on trip events only
    pub time: Option<Time>,
}

/// Directed edge as seen by a projection
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub kind: EdgeKind,
    pub cost: f64,
}

/// Point-in-time copy of the node labels and edge kinds a projection covers
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

pub trait GraphStore: Send + Sync {
    fn upsert_road_nodes(&self, nodes: &[RoadNode]) -> Result<usize, Error>;

    fn upsert_road_segments(&self, segments: &[RoadSegment]) -> Result<usize, Error>;

    fn upsert_stations(&self, stations: &[Station]) -> Result<usize, Error>;

    /// Writes trip events together with their HAS_EVENT and AT_STATION edges.
    ///
    /// Events referring to an unknown station are skipped; the number of
    /// events written is returned.
    fn upsert_trip_events(&self, events: &[TripEvent]) -> Result<usize, Error>;

    fn upsert_walk_links(&self, links: &[WalkLink]) -> Result<usize, Error>;

    fn upsert_amenities(&self, amenities: &[Amenity]) -> Result<usize, Error>;

    /// Exact great-circle nearest road node, `None` when there are no road nodes
    fn nearest_road_node(&self, point: Point<f64>) -> Result<Option<SnapResult>, Error>;

    /// Road nodes strictly closer than `radius_m`, nearest first
    fn road_nodes_within(&self, point: Point<f64>, radius_m: f64) -> Result<Vec<SnapResult>, Error>;

    fn stations(&self) -> Result<Vec<Station>, Error>;

    fn trip_event(&self, id: &str) -> Result<Option<TripEvent>, Error>;

    /// Ids of stations that have no WALK_TO edge in either direction
    fn stations_without_walk_links(&self) -> Result<Vec<String>, Error>;

    fn walk_links_of(&self, station_id: &str) -> Result<Vec<WalkLink>, Error>;

    /// All amenities, optionally of one kind
    fn amenities(&self, kind: Option<AmenityKind>) -> Result<Vec<Amenity>, Error>;

    fn amenities_within(
        &self,
        kind: Option<AmenityKind>,
        point: Point<f64>,
        radius_m: f64,
    ) -> Result<Vec<Amenity>, Error>;

    fn road_bounds(&self) -> Result<Option<GraphBounds>, Error>;

    fn stats(&self) -> Result<GraphStats, Error>;

    /// Whether every ingestion phase has finished against this store
    fn ingestion_complete(&self) -> Result<bool, Error>;

    fn mark_ingestion_complete(&self) -> Result<(), Error>;

    /// Sets `delay` and `actual_time` on events matching trip and stop id,
    /// returning the number of events touched
    fn apply_delays(&self, updates: &[DelayUpdate]) -> Result<usize, Error>;

    fn snapshot(&self, spec: &ProjectionSpec) -> Result<GraphSnapshot, Error>;
}
