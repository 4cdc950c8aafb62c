use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use transitweave_core::{
    model::{RoadNode, RoadSegment, SpeedTable},
    projection::{ProjectionCatalog, ProjectionManager, ProjectionSpec},
    routing::{AStarOracle, RouteQueryEngine, TravelMode},
    store::{GraphStore, MemoryGraphStore},
};

const GRID: usize = 60;
const STEP_DEG: f64 = 0.001;

/// Square street grid with residential blocks in both directions
fn grid_store() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    let id = |row: usize, col: usize| format!("{row}:{col}");

    let mut nodes = Vec::with_capacity(GRID * GRID);
    for row in 0..GRID {
        for col in 0..GRID {
            nodes.push(RoadNode::new(
                id(row, col),
                17.4 + row as f64 * STEP_DEG,
                78.4 + col as f64 * STEP_DEG,
            ));
        }
    }
    store.upsert_road_nodes(&nodes).unwrap();

    let mut segments = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            for (r, c) in [(row + 1, col), (row, col + 1)] {
                if r < GRID && c < GRID {
                    let segment = RoadSegment::new(id(row, col), id(r, c), 110.0, 30.0);
                    segments.push(segment.reversed());
                    segments.push(segment);
                }
            }
        }
    }
    store.upsert_road_segments(&segments).unwrap();
    store
}

fn bench_find_path(c: &mut Criterion) {
    let store = Arc::new(grid_store());
    let catalog = Arc::new(ProjectionCatalog::new());
    let projection = Arc::new(ProjectionManager::new(
        "bench",
        ProjectionSpec::multimodal(),
        store.clone(),
        catalog.clone(),
    ));
    projection.ensure().unwrap();

    let oracle = Arc::new(AStarOracle::for_speeds(catalog, &SpeedTable::default(), 1.4));
    let engine = RouteQueryEngine::new(store, oracle, projection);
    let far = 17.4 + (GRID - 1) as f64 * STEP_DEG;

    c.bench_function("find_path grid corner to corner", |b| {
        b.iter(|| {
            engine
                .find_path(
                    black_box(17.4),
                    black_box(78.4),
                    black_box(far),
                    black_box(78.4 + (GRID - 1) as f64 * STEP_DEG),
                    TravelMode::Drive,
                )
                .unwrap()
        });
    });

    c.bench_function("snap to nearest road node", |b| {
        b.iter(|| engine.snap(black_box(17.43), black_box(78.43)).unwrap());
    });
}

criterion_group!(benches, bench_find_path);
criterion_main!(benches);
