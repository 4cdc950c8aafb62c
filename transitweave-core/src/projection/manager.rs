use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;

use super::{Projection, ProjectionCatalog, ProjectionSpec};
use crate::{Error, store::GraphStore};

/// Owner of one named projection over a graph store.
///
/// Rebuilds always start from durable store data, so concurrent `ensure`
/// calls only race on which identical view gets registered last.
pub struct ProjectionManager {
    name: String,
    spec: ProjectionSpec,
    store: Arc<dyn GraphStore>,
    catalog: Arc<ProjectionCatalog>,
    rebuilds: AtomicUsize,
}

impl ProjectionManager {
    pub fn new(
        name: impl Into<String>,
        spec: ProjectionSpec,
        store: Arc<dyn GraphStore>,
        catalog: Arc<ProjectionCatalog>,
    ) -> Self {
        Self {
            name: name.into(),
            spec,
            store,
            catalog,
            rebuilds: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &Arc<ProjectionCatalog> {
        &self.catalog
    }

    /// Drops the view if present and rebuilds it in full from the store
    pub fn ensure(&self) -> Result<Arc<Projection>, Error> {
        if self.catalog.remove(&self.name)? {
            info!("Dropped projection '{}'", self.name);
        }

        let snapshot = self.store.snapshot(&self.spec)?;
        let projection = Projection::build(snapshot, &self.spec);
        info!(
            "Built projection '{}' with {} nodes and {} edges",
            self.name,
            projection.node_count(),
            projection.edge_count()
        );

        let projection = self.catalog.insert(&self.name, projection)?;
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        Ok(projection)
    }

    /// Drops the view, returning whether it existed
    pub fn invalidate(&self) -> Result<bool, Error> {
        self.catalog.remove(&self.name)
    }

    pub fn exists(&self) -> Result<bool, Error> {
        self.catalog.contains(&self.name)
    }

    /// Number of completed `ensure` calls
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds.load(Ordering::Relaxed)
    }
}
