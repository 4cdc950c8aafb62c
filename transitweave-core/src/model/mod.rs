//! Data model of the unified multimodal graph
//!
//! Node and edge records as they are written to and read from the graph store.

pub mod amenity;
pub mod graph;
pub mod road;
pub mod transit;

pub use amenity::{Amenity, AmenityDetails, AmenityKind};
pub use graph::{BoundingBox, EdgeKind, GraphBounds, NodeKey, NodeLabel};
pub use road::{RoadNode, RoadSegment, SpeedTable};
pub use transit::{DelayUpdate, Station, TripEvent, WalkLink, WalkLinkDirection};
