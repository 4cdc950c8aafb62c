//! R-tree over road nodes for snapping and radius queries.
//!
//! Nodes are indexed by their unit-sphere position rather than raw degrees:
//! chord length orders points exactly like great-circle distance, so the
//! nearest neighbour found by the tree is the haversine-nearest node, and a
//! radius in meters maps to a single squared chord bound.

use geo::Point;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geo_math::{self, chord_squared, unit_sphere};

use super::SnapResult;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct IndexedRoadNode {
    pub(super) id: String,
    pub(super) point: Point<f64>,
    position: [f64; 3],
}

impl IndexedRoadNode {
    pub(super) fn new(id: String, point: Point<f64>) -> Self {
        Self {
            id,
            point,
            position: unit_sphere(point),
        }
    }

    fn snap(&self, from: Point<f64>) -> SnapResult {
        SnapResult {
            node_id: self.id.clone(),
            point: self.point,
            distance: geo_math::distance(from, self.point),
        }
    }
}

impl RTreeObject for IndexedRoadNode {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedRoadNode {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

#[derive(Debug, Default)]
pub(super) struct RoadNodeIndex {
    tree: RTree<IndexedRoadNode>,
}

impl RoadNodeIndex {
    pub(super) fn bulk_load(nodes: Vec<IndexedRoadNode>) -> Self {
        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    /// Inserts a node, replacing a previously indexed position of it
    pub(super) fn upsert(&mut self, previous: Option<Point<f64>>, id: &str, point: Point<f64>) {
        if let Some(previous) = previous {
            if previous == point {
                return;
            }
            self.tree
                .remove(&IndexedRoadNode::new(id.to_string(), previous));
        }
        self.tree.insert(IndexedRoadNode::new(id.to_string(), point));
    }

    pub(super) fn nearest(&self, point: Point<f64>) -> Option<SnapResult> {
        self.tree
            .nearest_neighbor(&unit_sphere(point))
            .map(|node| node.snap(point))
    }

    pub(super) fn within(&self, point: Point<f64>, radius_m: f64) -> Vec<SnapResult> {
        let mut found: Vec<SnapResult> = self
            .tree
            .locate_within_distance(unit_sphere(point), chord_squared(radius_m))
            .map(|node| node.snap(point))
            // The chord bound is inclusive and the radius is exclusive
            .filter(|snap| snap.distance < radius_m)
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.tree.size()
    }
}
