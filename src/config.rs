use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use transitweave_core::loading::IngestConfig;

use crate::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "transitweave.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON document holding the persisted graph
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("transitweave-graph.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Search radius for `amenities --near`, meters
    pub amenity_radius_m: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            amenity_radius_m: 5000.0,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let config: AppConfig = toml::from_str(text)?;
        config.ingest.validate()?;
        if config.query.amenity_radius_m <= 0.0 || config.query.amenity_radius_m.is_nan() {
            return Err(AppError::InvalidArgument(format!(
                "query.amenity_radius_m must be positive, got {}",
                config.query.amenity_radius_m
            )));
        }
        Ok(config)
    }

    /// Explicit path wins; otherwise `transitweave.toml` in the working
    /// directory if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => {
                tracing::info!("No {DEFAULT_CONFIG_FILE} found, using default configuration");
                Ok(Self::default())
            }
        }
    }
}
