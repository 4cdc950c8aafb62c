//! End-to-end ingestion and routing over small on-disk fixtures

use std::fs;
use std::path::Path;
use std::sync::Arc;

use approx::assert_relative_eq;
use tempfile::TempDir;
use transitweave_core::{
    geo_math::{self, EARTH_RADIUS_M},
    loading::{IngestConfig, IngestionPipeline, MapSource, RetryPolicy},
    model::{BoundingBox, EdgeKind},
    projection::{ProjectionCatalog, ProjectionManager, ProjectionSpec},
    routing::{AStarOracle, RouteQueryEngine, SegmentMode, TravelMode},
    store::{GraphStore, MemoryGraphStore},
};

/// Longitude of road node Y, 1000 m east of X along the equator
fn y_lon() -> f64 {
    (1000.0 / EARTH_RADIUS_M).to_degrees()
}

const STATION_LAT: f64 = 0.006;
const STATION_LON: f64 = -0.002;

/// Two residential road nodes 1000 m apart and a station ~700 m from the
/// nearer one
fn write_fixtures(dir: &Path) -> IngestConfig {
    let overpass = format!(
        r#"{{"elements": [
            {{"type": "way", "id": 1, "nodes": [1, 2], "tags": {{"highway": "residential"}}}},
            {{"type": "node", "id": 1, "lat": 0.0, "lon": 0.0}},
            {{"type": "node", "id": 2, "lat": 0.0, "lon": {}}}
        ]}}"#,
        y_lon()
    );
    let roads = dir.join("roads.json");
    fs::write(&roads, overpass).unwrap();

    let gtfs = dir.join("gtfs");
    fs::create_dir(&gtfs).unwrap();
    fs::write(
        gtfs.join("stops.txt"),
        format!("stop_id,stop_name,stop_lat,stop_lon\nS,Isolated Stop,{STATION_LAT},{STATION_LON}\n"),
    )
    .unwrap();
    fs::write(
        gtfs.join("stop_times.txt"),
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
         t1,08:00:00,08:00:30,S,1\n\
         t1,25:05:00,25:05:00,S,2\n",
    )
    .unwrap();

    let ev = dir.join("ev.csv");
    fs::write(
        &ev,
        "id,lat,lon,charger_type,sockets,provider\nev1,0.001,0.001,CCS2,2,Grid\nev2,0.5,0.5,Type2,1,Grid\n",
    )
    .unwrap();

    IngestConfig {
        bbox: BoundingBox::new(-1.0, -1.0, 1.0, 1.0),
        map_source: Some(MapSource::OverpassJson { path: roads }),
        gtfs_dir: Some(gtfs),
        ev_points: Some(ev),
        retry: RetryPolicy::new(1, 0),
        ..Default::default()
    }
}

struct Harness {
    dir: TempDir,
    store: Arc<MemoryGraphStore>,
    catalog: Arc<ProjectionCatalog>,
    projection: Arc<ProjectionManager>,
    pipeline: IngestionPipeline,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    let store = Arc::new(MemoryGraphStore::new());
    let catalog = Arc::new(ProjectionCatalog::new());
    let projection = Arc::new(ProjectionManager::new(
        config.projection_name.clone(),
        ProjectionSpec::multimodal(),
        store.clone(),
        catalog.clone(),
    ));
    let pipeline = IngestionPipeline::new(config, store.clone(), projection.clone()).unwrap();

    Harness {
        dir,
        store,
        catalog,
        projection,
        pipeline,
    }
}

fn engine(h: &Harness) -> RouteQueryEngine {
    let oracle = Arc::new(AStarOracle::for_speeds(
        h.catalog.clone(),
        &Default::default(),
        1.4,
    ));
    RouteQueryEngine::new(h.store.clone(), oracle, h.projection.clone())
}

#[test]
fn isolated_station_is_repaired_and_routable() {
    let h = harness();
    let report = h.pipeline.ensure_ingested().unwrap();

    assert!(report.ingested);
    assert!(report.unavailable_sources.is_empty());
    assert_eq!(report.road_nodes, 2);
    assert_eq!(report.road_segments, 2);
    assert_eq!(report.stations, 1);
    assert_eq!(report.trip_events, 2);
    assert_eq!(report.walk_links, 0);
    assert_eq!(report.repaired_stations, 1);
    assert_eq!(report.amenities, 2);

    // Repair linked S to X, the nearer road node
    let links = h.store.walk_links_of("S").unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|l| l.road_node_id == "1"));
    assert!(links[0].distance_m > 500.0);

    let engine = engine(&h);
    let itinerary = engine
        .find_path(STATION_LAT, STATION_LON, 0.0, y_lon(), TravelMode::Transit)
        .unwrap();
    assert!(!itinerary.segments.is_empty());
    assert_eq!(itinerary.segments[0].mode, SegmentMode::Walk);
    assert_relative_eq!(itinerary.total_cost, 120.0, epsilon = 1e-6);
    assert_relative_eq!(itinerary.total_distance, 1000.0, epsilon = 1e-6);
    // Projection was built by ingestion, not by the query
    assert_eq!(h.projection.rebuild_count(), 1);
}

#[test]
fn every_station_has_a_walk_link_after_ingestion() {
    let h = harness();
    h.pipeline.ensure_ingested().unwrap();

    assert!(h.store.stations_without_walk_links().unwrap().is_empty());
    let stats = h.store.stats().unwrap();
    assert!(stats.walk_links >= 2 * stats.stations);
}

#[test]
fn edge_costs_are_seconds() {
    let h = harness();
    h.pipeline.ensure_ingested().unwrap();

    let snapshot = h.store.snapshot(&ProjectionSpec::multimodal()).unwrap();
    let road: Vec<_> = snapshot
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::RoadSegment)
        .collect();
    assert_eq!(road.len(), 2);
    for edge in &road {
        assert_relative_eq!(edge.cost, 120.0, epsilon = 1e-6);
    }

    for edge in snapshot.edges.iter().filter(|e| e.kind == EdgeKind::WalkTo) {
        let link = &h.store.walk_links_of("S").unwrap()[0];
        assert_relative_eq!(edge.cost, link.distance_m / 1.4, epsilon = 1e-9);
    }
    assert!(snapshot.edges.iter().all(|e| e.cost >= 0.0));
    assert_eq!(
        snapshot
            .edges
            .iter()
            .filter(|e| matches!(e.kind, EdgeKind::HasEvent | EdgeKind::AtStation))
            .count(),
        4
    );
}

#[test]
fn post_midnight_events_keep_their_time() {
    let h = harness();
    h.pipeline.ensure_ingested().unwrap();

    let event = h.store.trip_event("t1_2").unwrap().unwrap();
    assert_eq!(event.time, 25 * 3600 + 5 * 60);
    assert_eq!((event.lat, event.lon), (STATION_LAT, STATION_LON));
    let first = h.store.trip_event("t1_1").unwrap().unwrap();
    assert_eq!(first.departure_time, 8 * 3600 + 30);
}

#[test]
fn rerunning_ingestion_changes_nothing() {
    let h = harness();
    let first = h.pipeline.ensure_ingested().unwrap();
    let second = h.pipeline.ensure_ingested().unwrap();

    assert!(!second.ingested);
    assert_eq!(first.stats, second.stats);
    assert_eq!(first.projection_edges, second.projection_edges);
    assert_eq!(h.projection.rebuild_count(), 2);
}

#[test]
fn missing_projection_is_rebuilt_once_by_a_query() {
    let h = harness();
    h.pipeline.ensure_ingested().unwrap();
    assert!(h.projection.invalidate().unwrap());

    let engine = engine(&h);
    let itinerary = engine
        .find_path(0.0, 0.0, 0.0, y_lon(), TravelMode::Drive)
        .unwrap();
    assert!(!itinerary.is_no_route());
    assert_eq!(h.projection.rebuild_count(), 2);
}

#[test]
fn persisted_graph_skips_ingestion() {
    let h = harness();
    h.pipeline.ensure_ingested().unwrap();

    let file = h.dir.path().join("graph.json");
    h.store.save(&file).unwrap();
    let reopened = Arc::new(MemoryGraphStore::load(&file).unwrap());
    assert_eq!(reopened.stats().unwrap(), h.store.stats().unwrap());

    let projection = Arc::new(ProjectionManager::new(
        "multimodal",
        ProjectionSpec::multimodal(),
        reopened.clone(),
        Arc::new(ProjectionCatalog::new()),
    ));
    let pipeline = IngestionPipeline::new(
        IngestConfig {
            retry: RetryPolicy::new(1, 0),
            ..Default::default()
        },
        reopened,
        projection,
    )
    .unwrap();
    let report = pipeline.ensure_ingested().unwrap();
    assert!(!report.ingested);
    assert_eq!(report.projection_nodes, 2 + 1 + 2);
}

#[test]
fn unavailable_sources_do_not_stop_later_phases() {
    let dir = TempDir::new().unwrap();
    let mut config = write_fixtures(dir.path());
    config.map_source = Some(MapSource::OverpassJson {
        path: dir.path().join("missing.json"),
    });

    let store = Arc::new(MemoryGraphStore::new());
    let projection = Arc::new(ProjectionManager::new(
        "multimodal",
        ProjectionSpec::multimodal(),
        store.clone(),
        Arc::new(ProjectionCatalog::new()),
    ));
    let report = IngestionPipeline::new(config, store.clone(), projection)
        .unwrap()
        .ensure_ingested()
        .unwrap();

    assert_eq!(report.unavailable_sources.len(), 1);
    assert!(report.unavailable_sources[0].contains("missing.json"));
    assert_eq!(report.stations, 1);
    // No road nodes to repair against
    assert_eq!(store.stations_without_walk_links().unwrap(), vec!["S".to_string()]);
}

#[test]
fn amenities_are_listed_and_radius_filtered() {
    let h = harness();
    h.pipeline.ensure_ingested().unwrap();
    let engine = engine(&h);

    assert_eq!(engine.list_amenities(None).unwrap().len(), 2);
    let near = engine.amenities_near(None, 0.0, 0.0, 5000.0).unwrap();
    assert_eq!(near.len(), 1);
    assert_eq!(near[0].id, "ev1");

    let bounds = engine.graph_bounds().unwrap().unwrap();
    assert_eq!(bounds.min_lon, 0.0);
    assert_relative_eq!(bounds.max_lon, y_lon());
    assert_eq!(engine.list_stations().unwrap().len(), 1);
    assert!(geo_math::haversine(0.0, 0.0, 0.0, y_lon()) > 999.0);
}
