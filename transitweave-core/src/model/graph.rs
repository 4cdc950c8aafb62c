//! Identity and labelling shared by every node and edge of the graph

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

/// Node label, one per node family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    RoadNode,
    Station,
    TripEvent,
}

/// Identity of a routable node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "label", content = "id")]
pub enum NodeKey {
    Road(String),
    Station(String),
    Event(String),
}

impl NodeKey {
    pub fn label(&self) -> NodeLabel {
        match self {
            NodeKey::Road(_) => NodeLabel::RoadNode,
            NodeKey::Station(_) => NodeLabel::Station,
            NodeKey::Event(_) => NodeLabel::TripEvent,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            NodeKey::Road(id) | NodeKey::Station(id) | NodeKey::Event(id) => id,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.label(), self.id())
    }
}

/// Relationship type of an edge. All costs are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// RoadNode -> RoadNode, driving/walking along a way
    RoadSegment,
    /// Station <-> RoadNode pedestrian link
    WalkTo,
    /// Station -> TripEvent, boarding
    HasEvent,
    /// TripEvent -> Station, alighting
    AtStation,
}

/// Geographic extent used to restrict map-data ingestion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        (self.south..=self.north).contains(&point.y()) && (self.west..=self.east).contains(&point.x())
    }

    pub fn is_valid(&self) -> bool {
        self.south <= self.north
            && self.west <= self.east
            && (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north)
            && (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
    }
}

impl Default for BoundingBox {
    // Hyderabad metropolitan area
    fn default() -> Self {
        Self::new(17.2, 78.2, 17.8, 79.2)
    }
}

/// Extent of all road nodes, for client map framing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GraphBounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point<f64>>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => GraphBounds {
                    min_lat: point.y(),
                    max_lat: point.y(),
                    min_lon: point.x(),
                    max_lon: point.x(),
                },
                Some(b) => GraphBounds {
                    min_lat: b.min_lat.min(point.y()),
                    max_lat: b.max_lat.max(point.y()),
                    min_lon: b.min_lon.min(point.x()),
                    max_lon: b.max_lon.max(point.x()),
                },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let points = [Point::new(78.4, 17.3), Point::new(78.6, 17.1), Point::new(78.5, 17.5)];
        let bounds = GraphBounds::from_points(&points).unwrap();
        assert_eq!(bounds.min_lat, 17.1);
        assert_eq!(bounds.max_lat, 17.5);
        assert_eq!(bounds.min_lon, 78.4);
        assert_eq!(bounds.max_lon, 78.6);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(GraphBounds::from_points(&Vec::<Point<f64>>::new()).is_none());
    }

    #[test]
    fn test_bbox_contains() {
        let bbox = BoundingBox::default();
        assert!(bbox.contains(&Point::new(78.48, 17.38)));
        assert!(!bbox.contains(&Point::new(77.0, 17.38)));
        assert!(bbox.is_valid());
        assert!(!BoundingBox::new(18.0, 78.0, 17.0, 79.0).is_valid());
    }
}
