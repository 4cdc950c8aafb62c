use std::sync::{Arc, RwLock};

use hashbrown::HashMap;

use super::Projection;
use crate::Error;

/// Registry of materialized projections by name.
///
/// Views are immutable once registered and handed out as `Arc`s, so a search
/// keeps working on the view it started with even if the name is dropped or
/// rebuilt concurrently.
#[derive(Debug, Default)]
pub struct ProjectionCatalog {
    views: RwLock<HashMap<String, Arc<Projection>>>,
}

impl ProjectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Result<Option<Arc<Projection>>, Error> {
        let views = self.views.read().map_err(|_| Error::StorePoisoned)?;
        Ok(views.get(name).cloned())
    }

    pub fn contains(&self, name: &str) -> Result<bool, Error> {
        Ok(self.get(name)?.is_some())
    }

    /// Registers a view under `name`; the last registration wins
    pub fn insert(&self, name: &str, projection: Projection) -> Result<Arc<Projection>, Error> {
        let projection = Arc::new(projection);
        let mut views = self.views.write().map_err(|_| Error::StorePoisoned)?;
        views.insert(name.to_string(), Arc::clone(&projection));
        Ok(projection)
    }

    /// Drops the view, returning whether it existed
    pub fn remove(&self, name: &str) -> Result<bool, Error> {
        let mut views = self.views.write().map_err(|_| Error::StorePoisoned)?;
        Ok(views.remove(name).is_some())
    }
}
