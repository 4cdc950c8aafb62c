use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{Orientation, ProjectionSpec};
use crate::{
    Time, geo_math,
    model::{EdgeKind, NodeKey},
    store::GraphSnapshot,
};

/// Projection node
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    pub key: NodeKey,
    pub point: Point<f64>,
    /// Present on trip events only
    pub time: Option<Time>,
}

/// Projection edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedEdge {
    pub kind: EdgeKind,
    /// Seconds
    pub cost: f64,
}

/// Materialized multigraph over a graph snapshot.
///
/// Undirected edge kinds are stored as a pair of directed edges.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    graph: DiGraph<ProjectedNode, ProjectedEdge>,
    index: HashMap<NodeKey, NodeIndex>,
    /// Fastest great-circle speed any edge is weighted with, m/s
    max_speed_mps: f64,
}

impl Projection {
    pub fn build(snapshot: GraphSnapshot, spec: &ProjectionSpec) -> Self {
        let mut graph = DiGraph::with_capacity(snapshot.nodes.len(), snapshot.edges.len() * 2);
        let mut index = HashMap::with_capacity(snapshot.nodes.len());

        for node in snapshot.nodes {
            if !spec.includes_label(node.key.label()) || index.contains_key(&node.key) {
                continue;
            }
            let key = node.key.clone();
            let idx = graph.add_node(ProjectedNode {
                key: node.key,
                point: node.point,
                time: node.time,
            });
            index.insert(key, idx);
        }

        let mut seen: HashSet<(NodeIndex, NodeIndex, EdgeKind, u64)> = HashSet::new();
        let mut dangling = 0usize;
        let mut max_speed_mps = 0.0_f64;
        for edge in snapshot.edges {
            let Some(orientation) = spec.orientation(edge.kind) else {
                continue;
            };
            let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
                dangling += 1;
                continue;
            };
            let weight = ProjectedEdge {
                kind: edge.kind,
                cost: edge.cost,
            };
            max_speed_mps = max_speed_mps.max(edge_speed(&graph[from], &graph[to], edge.cost));

            if seen.insert((from, to, edge.kind, edge.cost.to_bits())) {
                graph.add_edge(from, to, weight);
            }
            if orientation == Orientation::Undirected
                && seen.insert((to, from, edge.kind, edge.cost.to_bits()))
            {
                graph.add_edge(to, from, weight);
            }
        }

        if dangling > 0 {
            debug!("Skipped {dangling} edges with endpoints outside the projection");
        }

        Self {
            graph,
            index,
            max_speed_mps,
        }
    }

    pub fn node_index(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&ProjectedNode> {
        self.graph.node_weight(index)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Upper bound on distance over cost across all edges. Infinite when a
    /// free edge joins two distinct points, zero without moving edges.
    pub fn max_speed_mps(&self) -> f64 {
        self.max_speed_mps
    }

    pub(crate) fn graph(&self) -> &DiGraph<ProjectedNode, ProjectedEdge> {
        &self.graph
    }
}

fn edge_speed(from: &ProjectedNode, to: &ProjectedNode, cost: f64) -> f64 {
    let distance = geo_math::distance(from.point, to.point);
    if distance <= 0.0 {
        0.0
    } else if cost > 0.0 {
        distance / cost
    } else {
        f64::INFINITY
    }
}
