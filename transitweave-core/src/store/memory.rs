//! In-process graph store with a JSON document on disk.
//!
//! HAS_EVENT and AT_STATION edges are not kept as separate records: every
//! stored trip event owns exactly one of each towards its station, and events
//! are only admitted when that station exists.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::spatial::{IndexedRoadNode, RoadNodeIndex};
use super::{GraphSnapshot, GraphStats, GraphStore, SnapResult, SnapshotEdge, SnapshotNode};
use crate::{
    Error, geo_math,
    model::{
        Amenity, AmenityKind, DelayUpdate, EdgeKind, GraphBounds, NodeKey, NodeLabel, RoadNode,
        RoadSegment, Station, TripEvent, WalkLink, WalkLinkDirection,
    },
    projection::ProjectionSpec,
};

type SegmentKey = (String, String, u64);
type WalkLinkKey = (String, String, WalkLinkDirection);

#[derive(Debug, Default)]
struct GraphData {
    road_nodes: HashMap<String, RoadNode>,
    road_segments: HashMap<SegmentKey, RoadSegment>,
    stations: HashMap<String, Station>,
    trip_events: HashMap<String, TripEvent>,
    walk_links: HashMap<WalkLinkKey, WalkLink>,
    amenities: HashMap<(AmenityKind, String), Amenity>,
    road_index: RoadNodeIndex,
    ingestion_complete: bool,
}

/// On-disk form of the graph
#[derive(Debug, Default, Serialize, Deserialize)]
struct GraphDocument {
    road_nodes: Vec<RoadNode>,
    road_segments: Vec<RoadSegment>,
    stations: Vec<Station>,
    trip_events: Vec<TripEvent>,
    walk_links: Vec<WalkLink>,
    amenities: Vec<Amenity>,
    /// Absent in documents written by an interrupted ingestion
    #[serde(default)]
    ingestion_complete: bool,
}

#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    data: RwLock<GraphData>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a graph previously written with [`MemoryGraphStore::save`]
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a graph document
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open graph store '{}': {}", path.display(), e),
            )
        })?;
        let document: GraphDocument = serde_json::from_reader(BufReader::new(file))?;

        let road_index = RoadNodeIndex::bulk_load(
            document
                .road_nodes
                .iter()
                .map(|node| IndexedRoadNode::new(node.id.clone(), node.point()))
                .collect(),
        );
        let data = GraphData {
            road_nodes: document
                .road_nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect(),
            road_segments: document
                .road_segments
                .into_iter()
                .map(|segment| (segment.key(), segment))
                .collect(),
            stations: document
                .stations
                .into_iter()
                .map(|station| (station.id.clone(), station))
                .collect(),
            trip_events: document
                .trip_events
                .into_iter()
                .map(|event| (event.id.clone(), event))
                .collect(),
            walk_links: document
                .walk_links
                .into_iter()
                .map(|link| (link.key(), link))
                .collect(),
            amenities: document
                .amenities
                .into_iter()
                .map(|amenity| ((amenity.kind(), amenity.id.clone()), amenity))
                .collect(),
            road_index,
            ingestion_complete: document.ingestion_complete,
        };

        let store = Self {
            data: RwLock::new(data),
        };
        info!("Loaded graph store from {}: {:?}", path.display(), store.stats()?);
        Ok(store)
    }

    /// Writes the whole graph to `path`, replacing it atomically
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let data = self.read()?;
        let mut document = GraphDocument {
            road_nodes: data.road_nodes.values().cloned().collect(),
            road_segments: data.road_segments.values().cloned().collect(),
            stations: data.stations.values().cloned().collect(),
            trip_events: data.trip_events.values().cloned().collect(),
            walk_links: data.walk_links.values().cloned().collect(),
            amenities: data.amenities.values().cloned().collect(),
            ingestion_complete: data.ingestion_complete,
        };
        drop(data);

        // Stable ordering keeps repeated saves of the same graph byte-identical
        document.road_nodes.sort_by(|a, b| a.id.cmp(&b.id));
        document.road_segments.sort_by_key(RoadSegment::key);
        document.stations.sort_by(|a, b| a.id.cmp(&b.id));
        document.trip_events.sort_by(|a, b| a.id.cmp(&b.id));
        document.walk_links.sort_by_key(WalkLink::key);
        document.amenities.sort_by(|a, b| a.id.cmp(&b.id));

        let tmp = path.with_extension("tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(writer, &document)?;
        }
        std::fs::rename(&tmp, path)?;
        debug!("Saved graph store to {}", path.display());
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphData>, Error> {
        self.data.read().map_err(|_| Error::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphData>, Error> {
        self.data.write().map_err(|_| Error::StorePoisoned)
    }
}

impl GraphStore for MemoryGraphStore {
    fn upsert_road_nodes(&self, nodes: &[RoadNode]) -> Result<usize, Error> {
        let mut data = self.write()?;
        for node in nodes {
            let previous = data
                .road_nodes
                .insert(node.id.clone(), node.clone())
                .map(|previous| previous.point());
            data.road_index.upsert(previous, &node.id, node.point());
        }
        Ok(nodes.len())
    }

    fn upsert_road_segments(&self, segments: &[RoadSegment]) -> Result<usize, Error> {
        let mut data = self.write()?;
        let mut written = 0;
        for segment in segments {
            if !data.road_nodes.contains_key(&segment.from) || !data.road_nodes.contains_key(&segment.to) {
                continue;
            }
            data.road_segments.insert(segment.key(), segment.clone());
            written += 1;
        }
        Ok(written)
    }

    fn upsert_stations(&self, stations: &[Station]) -> Result<usize, Error> {
        let mut data = self.write()?;
        for station in stations {
            data.stations.insert(station.id.clone(), station.clone());
        }
        Ok(stations.len())
    }

    fn upsert_trip_events(&self, events: &[TripEvent]) -> Result<usize, Error> {
        let mut data = self.write()?;
        let mut written = 0;
        for event in events {
            let Some(station) = data.stations.get(&event.stop_id) else {
                continue;
            };
            let mut event = TripEvent {
                lat: station.lat,
                lon: station.lon,
                ..event.clone()
            };
            if let Some(existing) = data.trip_events.get(&event.id) {
                event.delay = event.delay.or(existing.delay);
                event.actual_time = event.actual_time.or(existing.actual_time);
            }
            data.trip_events.insert(event.id.clone(), event);
            written += 1;
        }
        Ok(written)
    }

    fn upsert_walk_links(&self, links: &[WalkLink]) -> Result<usize, Error> {
        let mut data = self.write()?;
        let mut written = 0;
        for link in links {
            if !data.stations.contains_key(&link.station_id) || !data.road_nodes.contains_key(&link.road_node_id) {
                continue;
            }
            data.walk_links.insert(link.key(), link.clone());
            written += 1;
        }
        Ok(written)
    }

    fn upsert_amenities(&self, amenities: &[Amenity]) -> Result<usize, Error> {
        let mut data = self.write()?;
        for amenity in amenities {
            data.amenities
                .insert((amenity.kind(), amenity.id.clone()), amenity.clone());
        }
        Ok(amenities.len())
    }

    fn nearest_road_node(&self, point: Point<f64>) -> Result<Option<SnapResult>, Error> {
        Ok(self.read()?.road_index.nearest(point))
    }

    fn road_nodes_within(&self, point: Point<f64>, radius_m: f64) -> Result<Vec<SnapResult>, Error> {
        Ok(self.read()?.road_index.within(point, radius_m))
    }

    fn stations(&self) -> Result<Vec<Station>, Error> {
        let mut stations: Vec<Station> = self.read()?.stations.values().cloned().collect();
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(stations)
    }

    fn trip_event(&self, id: &str) -> Result<Option<TripEvent>, Error> {
        Ok(self.read()?.trip_events.get(id).cloned())
    }

    fn stations_without_walk_links(&self) -> Result<Vec<String>, Error> {
        let data = self.read()?;
        let linked: hashbrown::HashSet<&str> = data
            .walk_links
            .values()
            .map(|link| link.station_id.as_str())
            .collect();
        let mut orphans: Vec<String> = data
            .stations
            .keys()
            .filter(|id| !linked.contains(id.as_str()))
            .cloned()
            .collect();
        orphans.sort();
        Ok(orphans)
    }

    fn walk_links_of(&self, station_id: &str) -> Result<Vec<WalkLink>, Error> {
        let mut links: Vec<WalkLink> = self
            .read()?
            .walk_links
            .values()
            .filter(|link| link.station_id == station_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| a.road_node_id.cmp(&b.road_node_id));
        Ok(links)
    }

    fn amenities(&self, kind: Option<AmenityKind>) -> Result<Vec<Amenity>, Error> {
        let mut amenities: Vec<Amenity> = self
            .read()?
            .amenities
            .values()
            .filter(|amenity| kind.is_none_or(|kind| amenity.kind() == kind))
            .cloned()
            .collect();
        amenities.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(amenities)
    }

    fn amenities_within(
        &self,
        kind: Option<AmenityKind>,
        point: Point<f64>,
        radius_m: f64,
    ) -> Result<Vec<Amenity>, Error> {
        let mut found: Vec<(f64, Amenity)> = self
            .amenities(kind)?
            .into_iter()
            .map(|amenity| (geo_math::distance(point, amenity.point()), amenity))
            .filter(|(distance, _)| *distance < radius_m)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(found.into_iter().map(|(_, amenity)| amenity).collect())
    }

    fn road_bounds(&self) -> Result<Option<GraphBounds>, Error> {
        let data = self.read()?;
        let points: Vec<Point<f64>> = data.road_nodes.values().map(RoadNode::point).collect();
        Ok(GraphBounds::from_points(&points))
    }

    fn stats(&self) -> Result<GraphStats, Error> {
        let data = self.read()?;
        Ok(GraphStats {
            road_nodes: data.road_nodes.len(),
            road_segments: data.road_segments.len(),
            stations: data.stations.len(),
            trip_events: data.trip_events.len(),
            event_links: data.trip_events.len() * 2,
            walk_links: data.walk_links.len(),
            amenities: data.amenities.len(),
        })
    }

    fn ingestion_complete(&self) -> Result<bool, Error> {
        Ok(self.read()?.ingestion_complete)
    }

    fn mark_ingestion_complete(&self) -> Result<(), Error> {
        self.write()?.ingestion_complete = true;
        Ok(())
    }

    fn apply_delays(&self, updates: &[DelayUpdate]) -> Result<usize, Error> {
        let mut data = self.write()?;
        let delays: HashMap<(&str, &str), i32> = updates
            .iter()
            .map(|u| ((u.trip_id.as_str(), u.stop_id.as_str()), u.delay_secs))
            .collect();

        let mut touched = 0;
        for event in data.trip_events.values_mut() {
            if let Some(&delay) = delays.get(&(event.trip_id.as_str(), event.stop_id.as_str())) {
                event.delay = Some(delay);
                event.actual_time = Some(i64::from(event.time) + i64::from(delay));
                touched += 1;
            }
        }
        Ok(touched)
    }

    fn snapshot(&self, spec: &ProjectionSpec) -> Result<GraphSnapshot, Error> {
        let data = self.read()?;
        let mut snapshot = GraphSnapshot::default();

        if spec.includes_label(NodeLabel::RoadNode) {
            snapshot.nodes.extend(data.road_nodes.values().map(|node| SnapshotNode {
                key: NodeKey::Road(node.id.clone()),
                point: node.point(),
                time: None,
            }));
        }
        if spec.includes_label(NodeLabel::Station) {
            snapshot.nodes.extend(data.stations.values().map(|station| SnapshotNode {
                key: NodeKey::Station(station.id.clone()),
                point: station.point(),
                time: None,
            }));
        }
        if spec.includes_label(NodeLabel::TripEvent) {
            snapshot.nodes.extend(data.trip_events.values().map(|event| SnapshotNode {
                key: NodeKey::Event(event.id.clone()),
                point: event.point(),
                time: Some(event.time),
            }));
        }

        if spec.includes_edge(EdgeKind::RoadSegment) {
            snapshot.edges.extend(data.road_segments.values().map(|segment| SnapshotEdge {
                from: NodeKey::Road(segment.from.clone()),
                to: NodeKey::Road(segment.to.clone()),
                kind: EdgeKind::RoadSegment,
                cost: segment.cost,
            }));
        }
        if spec.includes_edge(EdgeKind::WalkTo) {
            snapshot.edges.extend(data.walk_links.values().map(|link| {
                let station = NodeKey::Station(link.station_id.clone());
                let road = NodeKey::Road(link.road_node_id.clone());
                let (from, to) = match link.direction {
                    WalkLinkDirection::StationToRoad => (station, road),
                    WalkLinkDirection::RoadToStation => (road, station),
                };
                SnapshotEdge {
                    from,
                    to,
                    kind: EdgeKind::WalkTo,
                    cost: link.cost,
                }
            }));
        }
        for event in data.trip_events.values() {
            let station = NodeKey::Station(event.stop_id.clone());
            let node = NodeKey::Event(event.id.clone());
            if spec.includes_edge(EdgeKind::HasEvent) {
                snapshot.edges.push(SnapshotEdge {
                    from: station.clone(),
                    to: node.clone(),
                    kind: EdgeKind::HasEvent,
                    cost: 0.0,
                });
            }
            if spec.includes_edge(EdgeKind::AtStation) {
                snapshot.edges.push(SnapshotEdge {
                    from: node,
                    to: station,
                    kind: EdgeKind::AtStation,
                    cost: 0.0,
                });
            }
        }

        // Deterministic order gives deterministic tie-breaking in path search
        snapshot.nodes.sort_by(|a, b| a.key.cmp(&b.key));
        snapshot
            .edges
            .sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)).then(a.cost.total_cmp(&b.cost)));
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(trip: &str, seq: u32, stop: &str, time: u32) -> TripEvent {
        TripEvent {
            id: TripEvent::event_id(trip, seq),
            trip_id: trip.into(),
            stop_id: stop.into(),
            stop_sequence: seq,
            arrival_time: time,
            departure_time: time,
            time,
            lat: 0.0,
            lon: 0.0,
            delay: None,
            actual_time: None,
        }
    }

    fn populated() -> MemoryGraphStore {
        let store = MemoryGraphStore::new();
        store
            .upsert_road_nodes(&[RoadNode::new("1", 0.0, 0.0), RoadNode::new("2", 0.0, 0.01)])
            .unwrap();
        let segment = RoadSegment::new("1", "2", 1000.0, 30.0);
        store
            .upsert_road_segments(&[segment.clone(), segment.reversed()])
            .unwrap();
        store
            .upsert_stations(&[Station::new("S", "Central", 0.001, 0.0)])
            .unwrap();
        store.upsert_trip_events(&[event("T1", 1, "S", 3600)]).unwrap();
        store
            .upsert_walk_links(&WalkLink::pair("S", "1", 111.0, 1.4))
            .unwrap();
        store
    }

    #[test]
    fn test_upserts_are_idempotent() {
        let store = populated();
        let before = store.stats().unwrap();

        let segment = RoadSegment::new("1", "2", 1000.0, 30.0);
        store
            .upsert_road_nodes(&[RoadNode::new("1", 0.0, 0.0)])
            .unwrap();
        store.upsert_road_segments(&[segment]).unwrap();
        store.upsert_trip_events(&[event("T1", 1, "S", 3600)]).unwrap();
        store
            .upsert_walk_links(&WalkLink::pair("S", "1", 111.0, 1.4))
            .unwrap();

        assert_eq!(store.stats().unwrap(), before);
        assert_eq!(before.road_segments, 2);
        assert_eq!(before.event_links, 2);
        assert_eq!(before.walk_links, 2);
    }

    #[test]
    fn test_event_copies_station_location() {
        let store = populated();
        let stored = store.trip_event("T1_1").unwrap().unwrap();
        assert_eq!(stored.lat, 0.001);
        assert_eq!(stored.lon, 0.0);
    }

    #[test]
    fn test_event_without_station_is_skipped() {
        let store = populated();
        let written = store.upsert_trip_events(&[event("T2", 1, "nowhere", 10)]).unwrap();
        assert_eq!(written, 0);
        assert!(store.trip_event("T2_1").unwrap().is_none());
    }

    #[test]
    fn test_delays_survive_reupsert() {
        let store = populated();
        let touched = store
            .apply_delays(&[DelayUpdate {
                trip_id: "T1".into(),
                stop_id: "S".into(),
                delay_secs: 90,
            }])
            .unwrap();
        assert_eq!(touched, 1);

        store.upsert_trip_events(&[event("T1", 1, "S", 3600)]).unwrap();
        let stored = store.trip_event("T1_1").unwrap().unwrap();
        assert_eq!(stored.delay, Some(90));
        assert_eq!(stored.actual_time, Some(3690));
    }

    #[test]
    fn test_stations_without_walk_links() {
        let store = populated();
        store
            .upsert_stations(&[Station::new("Far", "Far away", 1.0, 1.0)])
            .unwrap();
        assert_eq!(store.stations_without_walk_links().unwrap(), vec!["Far".to_string()]);
    }

    #[test]
    fn test_snapshot_respects_spec() {
        let store = populated();
        let snapshot = store.snapshot(&ProjectionSpec::multimodal()).unwrap();
        assert_eq!(snapshot.nodes.len(), 4);
        assert_eq!(snapshot.edges.len(), 6);

        let event_node = snapshot
            .nodes
            .iter()
            .find(|node| node.key == NodeKey::Event("T1_1".into()))
            .unwrap();
        assert_eq!(event_node.time, Some(3600));
    }

    #[test]
    fn test_save_and_load() {
        let store = populated();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        store.save(&path).unwrap();

        let loaded = MemoryGraphStore::load(&path).unwrap();
        assert_eq!(loaded.stats().unwrap(), store.stats().unwrap());
        assert!(!loaded.ingestion_complete().unwrap());
        assert_eq!(
            loaded
                .nearest_road_node(Point::new(0.009, 0.0))
                .unwrap()
                .unwrap()
                .node_id,
            "2"
        );
    }

    #[test]
    fn test_bounds() {
        let store = populated();
        let bounds = store.road_bounds().unwrap().unwrap();
        assert_eq!(bounds.min_lon, 0.0);
        assert_eq!(bounds.max_lon, 0.01);
        assert!(MemoryGraphStore::new().road_bounds().unwrap().is_none());
    }

    #[test]
    fn test_completion_marker_is_persisted() {
        let store = populated();
        assert!(!store.ingestion_complete().unwrap());
        store.mark_ingestion_complete().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        store.save(&path).unwrap();
        assert!(MemoryGraphStore::load(&path).unwrap().ingestion_complete().unwrap());

        // Documents without the marker load as incomplete
        std::fs::write(&path, r#"{"road_nodes": [], "road_segments": [], "stations": [],
            "trip_events": [], "walk_links": [], "amenities": []}"#)
            .unwrap();
        assert!(!MemoryGraphStore::load(&path).unwrap().ingestion_complete().unwrap());
    }
}
