use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use super::{
    amenities::load_amenities,
    config::{IngestConfig, MapSource},
    gtfs::{GtfsFeed, TransitNetworkBuilder},
    osm::{MapDataProvider, OverpassJsonSource, PbfMapSource},
    road::RoadNetworkBuilder,
};
use crate::{
    Error,
    model::AmenityKind,
    projection::ProjectionManager,
    store::{GraphStats, GraphStore},
};

/// Outcome of [`IngestionPipeline::ensure_ingested`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Whether ingestion ran; false when a previous run already completed
    pub ingested: bool,
    pub road_nodes: usize,
    pub road_segments: usize,
    pub stations: usize,
    pub trip_events: usize,
    pub walk_links: usize,
    pub repaired_stations: usize,
    pub amenities: usize,
    /// Phases abandoned because their source stayed unavailable
    pub unavailable_sources: Vec<String>,
    pub stats: GraphStats,
    pub projection_nodes: usize,
    pub projection_edges: usize,
}

/// Populates an empty store from the configured sources and brings the
/// routing projection up to date.
pub struct IngestionPipeline {
    config: IngestConfig,
    store: Arc<dyn GraphStore>,
    projection: Arc<ProjectionManager>,
    map_provider: Option<Box<dyn MapDataProvider>>,
}

impl IngestionPipeline {
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(
        config: IngestConfig,
        store: Arc<dyn GraphStore>,
        projection: Arc<ProjectionManager>,
    ) -> Result<Self, Error> {
        config.validate()?;

        let map_provider: Option<Box<dyn MapDataProvider>> = match &config.map_source {
            Some(MapSource::Pbf { path }) => Some(Box::new(PbfMapSource::new(path))),
            Some(MapSource::OverpassJson { path }) => Some(Box::new(OverpassJsonSource::new(path))),
            None => None,
        };

        Ok(Self {
            config,
            store,
            projection,
            map_provider,
        })
    }

    /// Replaces the map-data provider derived from the configuration
    #[must_use]
    pub fn with_map_provider(mut self, provider: Box<dyn MapDataProvider>) -> Self {
        self.map_provider = Some(provider);
        self
    }

    /// Ingests every configured source unless an earlier run completed
    /// against this store, then rebuilds the projection unconditionally.
    ///
    /// A phase whose source stays unavailable after its retries is skipped
    /// and reported; later phases still run. Any other failure aborts and
    /// leaves the store unmarked, so the next call ingests again over the
    /// partial graph.
    pub fn ensure_ingested(&self) -> Result<IngestReport, Error> {
        let mut report = IngestReport::default();

        if self.store.ingestion_complete()? {
            info!("Graph store already holds a complete graph, skipping ingestion");
        } else {
            if self.store.stats()?.is_empty() {
                info!("Graph store is empty, starting ingestion");
            } else {
                warn!("Graph store holds an incomplete graph, ingesting again");
            }
            report.ingested = true;
            self.ingest_roads(&mut report)?;
            self.ingest_transit(&mut report)?;
            self.ingest_amenities(&mut report)?;
            self.store.mark_ingestion_complete()?;
            release_memory();
        }

        report.stats = self.store.stats()?;
        info!("Graph contents: {:?}", report.stats);

        let projection = self.projection.ensure()?;
        report.projection_nodes = projection.node_count();
        report.projection_edges = projection.edge_count();
        Ok(report)
    }

    fn ingest_roads(&self, report: &mut IngestReport) -> Result<(), Error> {
        let Some(provider) = &self.map_provider else {
            warn!("No map source configured, skipping road network");
            return Ok(());
        };

        let name = provider.name();
        info!("Processing street data from {name}");
        let fetched = self.config.retry.run(&name, || provider.fetch(&self.config.bbox));
        let Some(data) = skip_unavailable(fetched, report)? else {
            return Ok(());
        };

        let summary = RoadNetworkBuilder::new(self.store.as_ref(), &self.config.speeds, self.config.batch_size)
            .build(&data)?;
        report.road_nodes = summary.nodes;
        report.road_segments = summary.segments;
        Ok(())
    }

    fn ingest_transit(&self, report: &mut IngestReport) -> Result<(), Error> {
        let Some(dir) = &self.config.gtfs_dir else {
            warn!("No GTFS directory configured, skipping transit network");
            return Ok(());
        };

        info!("Processing public transit data from {}", dir.display());
        let name = format!("GTFS feed '{}'", dir.display());
        let fetched = self.config.retry.run(&name, || GtfsFeed::from_dir(dir));
        let Some(feed) = skip_unavailable(fetched, report)? else {
            return Ok(());
        };

        let summary = TransitNetworkBuilder::new(
            self.store.as_ref(),
            self.config.batch_size,
            self.config.walk_radius_m,
            self.config.walking_speed_mps,
        )
        .build(&feed)?;
        report.stations = summary.stations;
        report.trip_events = summary.trip_events;
        report.walk_links = summary.walk_links;
        report.repaired_stations = summary.repaired;
        Ok(())
    }

    fn ingest_amenities(&self, report: &mut IngestReport) -> Result<(), Error> {
        let sources = [
            (self.config.ev_points.as_ref(), AmenityKind::EvPoint),
            (self.config.bike_hubs.as_ref(), AmenityKind::BikeHub),
        ];
        for (path, kind) in sources {
            let Some(path) = path else { continue };
            let name = format!("{kind} file '{}'", path.display());
            let fetched = self.config.retry.run(&name, || load_amenities(path, kind));
            if let Some(amenities) = skip_unavailable(fetched, report)? {
                report.amenities += self.store.upsert_amenities(&amenities)?;
            }
        }
        Ok(())
    }
}

/// Turns an exhausted source into a skipped phase, passing other errors on
fn skip_unavailable<T>(result: Result<T, Error>, report: &mut IngestReport) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ Error::SourceUnavailable { .. }) => {
            warn!("{err}; continuing without it");
            if let Error::SourceUnavailable { source_name, .. } = err {
                report.unavailable_sources.push(source_name);
            }
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// While parsing OSM protobuf data and deserializing CSV, large amounts of
/// memory are allocated and not always returned to the system. This releases
/// free memory from the tail of the heap.
fn release_memory() {
    // # Safety
    //
    // This call is safe to use on linux with glibc implementation
    // which is checked by the cfg attribute in compile time.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::debug!("No heap memory to trim");
        } else {
            log::debug!("Successfully trimmed unused heap memory");
        }
    }
}
