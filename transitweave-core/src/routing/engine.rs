use std::sync::Arc;

use geo::Point;
use log::{debug, info, warn};

use super::{
    Itinerary, OraclePath, OracleError, PathRequest, ShortestPathOracle, TravelMode,
    itinerary::{decode, total_distance},
};
use crate::{
    Error,
    model::{Amenity, AmenityKind, GraphBounds, NodeKey, Station},
    projection::ProjectionManager,
    store::{GraphStore, SnapResult},
};

/// Answers route and read queries against the persisted graph.
///
/// Path search goes through the oracle over the managed projection; a missing
/// projection is rebuilt once per query before giving up.
pub struct RouteQueryEngine {
    store: Arc<dyn GraphStore>,
    oracle: Arc<dyn ShortestPathOracle>,
    projection: Arc<ProjectionManager>,
}

impl RouteQueryEngine {
    pub fn new(
        store: Arc<dyn GraphStore>,
        oracle: Arc<dyn ShortestPathOracle>,
        projection: Arc<ProjectionManager>,
    ) -> Self {
        Self {
            store,
            oracle,
            projection,
        }
    }

    pub fn projection(&self) -> &Arc<ProjectionManager> {
        &self.projection
    }

    /// Nearest road node to a coordinate, `None` when there are no road nodes
    pub fn snap(&self, lat: f64, lon: f64) -> Result<Option<SnapResult>, Error> {
        self.store.nearest_road_node(Point::new(lon, lat))
    }

    pub fn find_path(
        &self,
        start_lat: f64,
        start_lon: f64,
        end_lat: f64,
        end_lon: f64,
        mode: TravelMode,
    ) -> Result<Itinerary, Error> {
        let (Some(start), Some(end)) = (self.snap(start_lat, start_lon)?, self.snap(end_lat, end_lon)?)
        else {
            debug!("No road node to snap to, returning empty itinerary");
            return Ok(Itinerary::no_route());
        };

        let source = NodeKey::Road(start.node_id);
        let target = NodeKey::Road(end.node_id);
        let request = PathRequest {
            view: self.projection.name(),
            source: &source,
            target: &target,
            edge_kinds: mode.allowed_edges(),
        };

        let path = match self.oracle.shortest_path(&request) {
            Err(OracleError::ViewNotFound(name)) => {
                info!("Projection '{name}' missing, rebuilding before retry");
                self.projection.ensure()?;
                match self.oracle.shortest_path(&request) {
                    Err(OracleError::ViewNotFound(name)) => return Err(Error::ProjectionMissing(name)),
                    other => other?,
                }
            }
            other => other?,
        };

        Ok(Self::to_itinerary(path, mode))
    }

    fn to_itinerary(path: Option<OraclePath>, mode: TravelMode) -> Itinerary {
        let Some(path) = path else {
            return Itinerary::no_route();
        };
        if path.nodes.is_empty() || !path.total_cost.is_finite() {
            if !path.nodes.is_empty() {
                warn!("Oracle returned non-finite cost {} for a {mode} path", path.total_cost);
            }
            return Itinerary::no_route();
        }

        Itinerary {
            segments: decode(&path.nodes),
            total_cost: path.total_cost,
            total_distance: total_distance(&path.nodes),
        }
    }

    pub fn list_stations(&self) -> Result<Vec<Station>, Error> {
        self.store.stations()
    }

    /// All amenities, optionally restricted to one kind
    pub fn list_amenities(&self, kind: Option<AmenityKind>) -> Result<Vec<Amenity>, Error> {
        self.store.amenities(kind)
    }

    /// Amenities strictly within `radius_m` of a coordinate, nearest first
    pub fn amenities_near(
        &self,
        kind: Option<AmenityKind>,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> Result<Vec<Amenity>, Error> {
        self.store.amenities_within(kind, Point::new(lon, lat), radius_m)
    }

    /// Extent of the road network, `None` before any road node is ingested
    pub fn graph_bounds(&self) -> Result<Option<GraphBounds>, Error> {
        self.store.road_bounds()
    }
}
