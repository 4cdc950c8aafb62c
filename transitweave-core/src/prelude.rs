// Re-export key components
pub use crate::Error;
pub use crate::loading::{IngestConfig, IngestReport, IngestionPipeline, MapSource, RetryPolicy};
pub use crate::model::{Amenity, AmenityKind, BoundingBox, GraphBounds, Station};
pub use crate::projection::{DEFAULT_PROJECTION, ProjectionCatalog, ProjectionManager, ProjectionSpec};
pub use crate::routing::{
    AStarOracle, Itinerary, RouteQueryEngine, Segment, SegmentMode, ShortestPathOracle, TravelMode,
};
pub use crate::store::{GraphStats, GraphStore, MemoryGraphStore};

// Core types for schedules
pub use crate::Time; // seconds
