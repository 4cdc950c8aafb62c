//! Named, read-oriented views of the persisted graph used for path search.
//!
//! A projection is a pure function of the graph at the time it was built and
//! carries nothing the store does not already hold, so it can always be
//! dropped and rebuilt. Writes made after a build stay invisible to routing
//! until the next build.

mod catalog;
mod manager;
mod spec;
mod view;

pub use catalog::ProjectionCatalog;
pub use manager::ProjectionManager;
pub use spec::{Orientation, ProjectionSpec};
pub use view::{ProjectedEdge, ProjectedNode, Projection};

/// Name of the multimodal projection
pub const DEFAULT_PROJECTION: &str = "multimodal";
