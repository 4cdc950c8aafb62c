//! Point-of-interest amenities. They are stored alongside the routing graph
//! but never take part in it.

use std::fmt;
use std::str::FromStr;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityKind {
    EvPoint,
    BikeHub,
}

impl FromStr for AmenityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ev" | "ev_point" | "evpoint" | "charger" => Ok(AmenityKind::EvPoint),
            "bike" | "bike_hub" | "bikehub" => Ok(AmenityKind::BikeHub),
            other => Err(Error::InvalidData(format!("Unknown amenity kind: {other}"))),
        }
    }
}

impl fmt::Display for AmenityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmenityKind::EvPoint => write!(f, "ev_point"),
            AmenityKind::BikeHub => write!(f, "bike_hub"),
        }
    }
}

/// Type-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmenityDetails {
    EvPoint {
        charger_type: String,
        sockets: u32,
        provider: String,
    },
    BikeHub {
        capacity: u32,
        has_ebikes: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub details: AmenityDetails,
}

impl Amenity {
    pub fn kind(&self) -> AmenityKind {
        match self.details {
            AmenityDetails::EvPoint { .. } => AmenityKind::EvPoint,
            AmenityDetails::BikeHub { .. } => AmenityKind::BikeHub,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}
