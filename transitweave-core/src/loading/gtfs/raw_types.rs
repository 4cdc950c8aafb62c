//! Rows of the two GTFS files the transit builder reads. Values stay as
//! strings so one malformed cell is reported by the builder with its trip
//! context instead of rejecting the row at CSV level.

use serde::Deserialize;

/// Row of `stops.txt`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: String,
    pub stop_lon: String,
}

/// Row of `stop_times.txt`; times are `HH:MM:SS` and may pass 24:00:00
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedStopTime {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: String,
}
