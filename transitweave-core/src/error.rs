use thiserror::Error;

use crate::routing::OracleError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source '{source_name}' unavailable after {attempts} attempts: {reason}")]
    SourceUnavailable {
        source_name: String,
        attempts: u32,
        reason: String,
    },
    #[error("Malformed schedule time '{value}': expected HH:MM:SS")]
    MalformedScheduleTime { value: String },
    #[error("Projection '{0}' is missing")]
    ProjectionMissing(String),
    #[error("Shortest path oracle failed: {0}")]
    Oracle(#[from] OracleError),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Graph store lock poisoned")]
    StorePoisoned,
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Real-time feed decode error: {0}")]
    FeedDecode(#[from] prost::DecodeError),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
