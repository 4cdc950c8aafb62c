use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::EdgeKind;

/// Travel mode of a route query, restricting the edge kinds a path may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Transit,
    Walk,
    Drive,
}

impl TravelMode {
    /// Case-insensitive; any name other than `transit` or `walk` drives
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "transit" => Self::Transit,
            "walk" => Self::Walk,
            _ => Self::Drive,
        }
    }

    pub fn allowed_edges(self) -> &'static [EdgeKind] {
        match self {
            Self::Transit => &[
                EdgeKind::RoadSegment,
                EdgeKind::WalkTo,
                EdgeKind::HasEvent,
                EdgeKind::AtStation,
            ],
            Self::Walk => &[EdgeKind::RoadSegment, EdgeKind::WalkTo],
            Self::Drive => &[EdgeKind::RoadSegment],
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transit => "transit",
            Self::Walk => "walk",
            Self::Drive => "drive",
        };
        f.write_str(name)
    }
}
