//! In-process shortest-path oracle: A* over a named projection, guided by
//! great-circle distance to the target.

mod state;

use std::collections::BinaryHeap;
use std::sync::Arc;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use self::state::State;
use super::oracle::{OracleError, OraclePath, PathNode, PathRequest, ShortestPathOracle};
use crate::{
    geo_math,
    model::{EdgeKind, SpeedTable},
    projection::{Projection, ProjectionCatalog},
};

pub struct AStarOracle {
    catalog: Arc<ProjectionCatalog>,
    /// Lower limit for the heuristic speed bound, m/s. The bound used for a
    /// search is the larger of this and the fastest edge of the projection.
    max_speed_mps: f64,
}

impl AStarOracle {
    pub fn new(catalog: Arc<ProjectionCatalog>, max_speed_mps: f64) -> Self {
        Self {
            catalog,
            max_speed_mps,
        }
    }

    /// Oracle seeded with the fastest speed of `speeds` and `walking_speed_mps`
    pub fn for_speeds(catalog: Arc<ProjectionCatalog>, speeds: &SpeedTable, walking_speed_mps: f64) -> Self {
        // Segments with a non-positive speed cost their length, i.e. 1 m/s
        let max_speed_mps = (speeds.max_kmh() / 3.6).max(walking_speed_mps).max(1.0);
        Self::new(catalog, max_speed_mps)
    }
}

impl ShortestPathOracle for AStarOracle {
    fn shortest_path(&self, request: &PathRequest<'_>) -> Result<Option<OraclePath>, OracleError> {
        let projection = self
            .catalog
            .get(request.view)
            .map_err(|e| OracleError::Failed(e.to_string()))?
            .ok_or_else(|| OracleError::ViewNotFound(request.view.to_string()))?;

        let source = projection
            .node_index(request.source)
            .ok_or_else(|| OracleError::UnknownNode(request.source.clone()))?;
        let target = projection
            .node_index(request.target)
            .ok_or_else(|| OracleError::UnknownNode(request.target.clone()))?;

        let max_speed_mps = projection.max_speed_mps().max(self.max_speed_mps);
        let Some((total_cost, path)) = astar(
            &projection,
            source,
            target,
            request.edge_kinds,
            max_speed_mps,
        ) else {
            return Ok(None);
        };

        let nodes = path
            .into_iter()
            .filter_map(|idx| projection.node(idx))
            .map(|node| PathNode {
                key: node.key.clone(),
                lat: node.point.y(),
                lon: node.point.x(),
                time: node.time,
            })
            .collect();

        Ok(Some(OraclePath { nodes, total_cost }))
    }
}

/// A* restricted to `allowed` edge kinds.
/// Returns the total cost and the node sequence from `start` to `target`.
fn astar(
    projection: &Projection,
    start: NodeIndex,
    target: NodeIndex,
    allowed: &[EdgeKind],
    max_speed_mps: f64,
) -> Option<(f64, Vec<NodeIndex>)> {
    let graph = projection.graph();
    let target_point = graph[target].point;
    // An infinite bound degrades to Dijkstra
    let estimate = |node: NodeIndex| {
        if max_speed_mps > 0.0 {
            geo_math::distance(graph[node].point, target_point) / max_speed_mps
        } else {
            0.0
        }
    };

    let mut costs: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut closed = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::new();

    costs.insert(start, 0.0);
    heap.push(State {
        estimate: estimate(start),
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node, .. }) = heap.pop() {
        if node == target {
            return Some((cost, reconstruct_path(&predecessors, start, target)));
        }

        // Skip stale heap entries
        if closed.put(node.index()) {
            continue;
        }

        for edge in graph.edges(node) {
            let weight = edge.weight();
            if !allowed.contains(&weight.kind) {
                continue;
            }
            let next = edge.target();
            if closed.contains(next.index()) {
                continue;
            }
            let next_cost = cost + weight.cost;

            match costs.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost >= *entry.get() {
                        continue;
                    }
                    *entry.get_mut() = next_cost;
                }
            }
            predecessors.insert(next, node);
            heap.push(State {
                estimate: next_cost + estimate(next),
                cost: next_cost,
                node: next,
            });
        }
    }

    None
}

fn reconstruct_path(
    predecessors: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    target: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        match predecessors.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
