//! Rider-facing itineraries decoded from oracle node paths

mod decode;
mod to_geojson;

use serde::{Deserialize, Serialize};

pub use decode::{decode, total_distance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentMode {
    Walk,
    Transit,
}

impl SegmentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "WALK",
            Self::Transit => "TRANSIT",
        }
    }
}

/// Consecutive coordinates travelled in one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub mode: SegmentMode,
    /// `[lat, lon]` pairs
    pub coords: Vec<[f64; 2]>,
}

impl Segment {
    pub(crate) fn new(mode: SegmentMode, first: [f64; 2]) -> Self {
        Self {
            mode,
            coords: vec![first],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub segments: Vec<Segment>,
    /// Seconds, `-1` when there is no route
    pub total_cost: f64,
    /// Meters along the full node path
    pub total_distance: f64,
}

impl Itinerary {
    /// Canonical result for unsnappable endpoints and unreachable targets
    pub fn no_route() -> Self {
        Self {
            segments: Vec::new(),
            total_cost: -1.0,
            total_distance: 0.0,
        }
    }

    pub fn is_no_route(&self) -> bool {
        self.segments.is_empty() && self.total_cost < 0.0
    }
}
