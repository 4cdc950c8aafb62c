use hashbrown::{HashMap, HashSet};

use crate::model::{EdgeKind, NodeLabel};

/// Traversal orientation of an edge kind inside a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Edges are traversable only in their stored direction
    Natural,
    /// Edges are traversable in both directions
    Undirected,
}

/// Node labels and edge kinds a projection covers. Every projected edge is
/// weighted by its `cost` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSpec {
    labels: HashSet<NodeLabel>,
    edges: HashMap<EdgeKind, Orientation>,
}

impl ProjectionSpec {
    pub fn new(
        labels: impl IntoIterator<Item = NodeLabel>,
        edges: impl IntoIterator<Item = (EdgeKind, Orientation)>,
    ) -> Self {
        Self {
            labels: labels.into_iter().collect(),
            edges: edges.into_iter().collect(),
        }
    }

    /// Road nodes, stations and trip events joined by all four edge kinds.
    /// Road segments and walk links are undirected, boarding and alighting
    /// keep their direction.
    pub fn multimodal() -> Self {
        Self::new(
            [NodeLabel::RoadNode, NodeLabel::Station, NodeLabel::TripEvent],
            [
                (EdgeKind::RoadSegment, Orientation::Undirected),
                (EdgeKind::WalkTo, Orientation::Undirected),
                (EdgeKind::HasEvent, Orientation::Natural),
                (EdgeKind::AtStation, Orientation::Natural),
            ],
        )
    }

    pub fn includes_label(&self, label: NodeLabel) -> bool {
        self.labels.contains(&label)
    }

    pub fn includes_edge(&self, kind: EdgeKind) -> bool {
        self.edges.contains_key(&kind)
    }

    pub fn orientation(&self, kind: EdgeKind) -> Option<Orientation> {
        self.edges.get(&kind).copied()
    }
}

impl Default for ProjectionSpec {
    fn default() -> Self {
        Self::multimodal()
    }
}
