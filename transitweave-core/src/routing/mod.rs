mod astar;
mod engine;
pub mod itinerary;
mod mode;
mod oracle;

pub use astar::AStarOracle;
pub use engine::RouteQueryEngine;
pub use itinerary::{Itinerary, Segment, SegmentMode};
pub use mode::TravelMode;
pub use oracle::{OracleError, OraclePath, PathNode, PathRequest, ShortestPathOracle};
