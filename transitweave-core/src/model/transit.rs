//! Time-expanded transit components - stations, trip events and their links
//! to the road network

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Time;

/// Fixed transit stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// One scheduled stop-visit of one trip.
///
/// Location is copied from the parent station at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEvent {
    /// `{trip_id}_{stop_sequence}`
    pub id: String,
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    /// Seconds since service-day midnight, may exceed 86400
    pub arrival_time: Time,
    pub departure_time: Time,
    /// Canonical event time, equal to the arrival time
    pub time: Time,
    pub lat: f64,
    pub lon: f64,
    /// Real-time delay in seconds, informational only
    pub delay: Option<i32>,
    /// `time + delay`, informational only
    pub actual_time: Option<i64>,
}

impl TripEvent {
    pub fn event_id(trip_id: &str, stop_sequence: u32) -> String {
        format!("{trip_id}_{stop_sequence}")
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Direction of a pedestrian link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WalkLinkDirection {
    StationToRoad,
    RoadToStation,
}

/// Directed WALK_TO edge between a station and a road node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkLink {
    pub station_id: String,
    pub road_node_id: String,
    pub direction: WalkLinkDirection,
    /// Meters
    pub distance_m: f64,
    /// Seconds at walking speed
    pub cost: f64,
}

impl WalkLink {
    /// Symmetric pair of links for a station and a road node `distance_m` apart
    pub fn pair(
        station_id: &str,
        road_node_id: &str,
        distance_m: f64,
        walking_speed_mps: f64,
    ) -> [WalkLink; 2] {
        let cost = distance_m / walking_speed_mps;
        let link = |direction| WalkLink {
            station_id: station_id.to_string(),
            road_node_id: road_node_id.to_string(),
            direction,
            distance_m,
            cost,
        };
        [
            link(WalkLinkDirection::StationToRoad),
            link(WalkLinkDirection::RoadToStation),
        ]
    }

    pub fn key(&self) -> (String, String, WalkLinkDirection) {
        (
            self.station_id.clone(),
            self.road_node_id.clone(),
            self.direction,
        )
    }
}

/// Real-time delay for one stop of one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayUpdate {
    pub trip_id: String,
    pub stop_id: String,
    pub delay_secs: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_walk_link_pair() {
        let [out, back] = WalkLink::pair("s1", "42", 140.0, 1.4);
        assert_eq!(out.direction, WalkLinkDirection::StationToRoad);
        assert_eq!(back.direction, WalkLinkDirection::RoadToStation);
        assert_relative_eq!(out.cost, 100.0);
        assert_eq!(out.cost, back.cost);
        assert_ne!(out.key(), back.key());
    }

    #[test]
    fn test_event_id_is_composite() {
        assert_eq!(TripEvent::event_id("T1", 3), "T1_3");
        assert_ne!(TripEvent::event_id("T1", 3), TripEvent::event_id("T1", 4));
    }
}
