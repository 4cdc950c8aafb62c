//! Contract of the shortest-path capability routing queries are answered by.

use geo::Point;
use thiserror::Error;

use crate::{
    Time,
    model::{EdgeKind, NodeKey},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Projection '{0}' not found")]
    ViewNotFound(String),
    #[error("Node {0} is not part of the projection")]
    UnknownNode(NodeKey),
    #[error("{0}")]
    Failed(String),
}

/// Minimum-cost path request against a named projection.
/// Edges are always weighted by their `cost` attribute.
#[derive(Debug, Clone, Copy)]
pub struct PathRequest<'a> {
    pub view: &'a str,
    pub source: &'a NodeKey,
    pub target: &'a NodeKey,
    pub edge_kinds: &'a [EdgeKind],
}

/// Node visited by a path
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub key: NodeKey,
    pub lat: f64,
    pub lon: f64,
    /// Present on trip events only
    pub time: Option<Time>,
}

impl PathNode {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    pub fn is_trip_event(&self) -> bool {
        self.time.is_some()
    }
}

/// Ordered node path with its accumulated cost in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct OraclePath {
    pub nodes: Vec<PathNode>,
    pub total_cost: f64,
}

pub trait ShortestPathOracle: Send + Sync {
    /// `Ok(None)` when the target is unreachable, `ViewNotFound` when the
    /// projection does not exist.
    fn shortest_path(&self, request: &PathRequest<'_>) -> Result<Option<OraclePath>, OracleError>;
}
