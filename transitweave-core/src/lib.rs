//! Core of a multimodal trip planner over one unified graph of roads,
//! time-expanded transit schedules and amenity points.
//!
//! Data flows one way: sources are loaded into a [`store::GraphStore`], a
//! [`projection::ProjectionManager`] materializes a routing view over it, and
//! [`routing::RouteQueryEngine`] answers path queries against that view
//! through a [`routing::ShortestPathOracle`], decoding paths into
//! mode-tagged [`routing::Itinerary`] segments.

mod error;
pub mod geo_math;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod projection;
pub mod routing;
pub mod store;

pub use error::Error;

/// Seconds since service-day midnight, may exceed 86400 for trips running
/// past midnight
pub type Time = u32;
