//! Road network components - nodes, segments and free-flow speeds

use geo::Point;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Intersection or shape vertex of the road network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadNode {
    /// OSM ID of the node
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

impl RoadNode {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Directed traversal between two road nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub from: String,
    pub to: String,
    /// Great-circle length in meters
    pub distance_m: f64,
    /// Free-flow speed in km/h
    pub speed_kmh: f64,
    /// Traversal time in seconds
    pub cost: f64,
}

impl RoadSegment {
    /// Segment weighted by free-flow travel time.
    ///
    /// A non-positive speed falls back to the raw distance as cost.
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance_m: f64, speed_kmh: f64) -> Self {
        let cost = if speed_kmh > 0.0 {
            (distance_m / 1000.0) / speed_kmh * 3600.0
        } else {
            distance_m
        };
        Self {
            from: from.into(),
            to: to.into(),
            distance_m,
            speed_kmh,
            cost,
        }
    }

    /// The same segment traversed in the opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            ..self.clone()
        }
    }

    /// Identity of the segment: endpoints plus length
    pub fn key(&self) -> (String, String, u64) {
        (self.from.clone(), self.to.clone(), self.distance_m.to_bits())
    }
}

/// Free-flow speed per `highway` classification, km/h
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTable {
    pub classes: HashMap<String, f64>,
    /// Speed for classifications missing from `classes`
    pub default_kmh: f64,
}

impl Default for SpeedTable {
    fn default() -> Self {
        let classes = [
            ("motorway", 100.0),
            ("trunk", 80.0),
            ("primary", 60.0),
            ("secondary", 50.0),
            ("tertiary", 40.0),
            ("unclassified", 30.0),
            ("residential", 30.0),
            ("living_street", 20.0),
            ("service", 15.0),
            ("pedestrian", 5.0),
        ]
        .into_iter()
        .map(|(class, speed)| (class.to_string(), speed))
        .collect();

        Self {
            classes,
            default_kmh: 30.0,
        }
    }
}

impl SpeedTable {
    pub fn speed_for(&self, highway: &str) -> f64 {
        self.classes.get(highway).copied().unwrap_or(self.default_kmh)
    }

    /// Fastest speed any road segment can be weighted with
    pub fn max_kmh(&self) -> f64 {
        self.classes.values().copied().fold(self.default_kmh, f64::max)
    }
}
