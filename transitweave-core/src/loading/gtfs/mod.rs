//! Schedule feed loading and the time-expanded transit network

mod parser;
mod processor;
mod raw_types;

pub use parser::{deserialize_gtfs_file, parse_time};
pub use processor::{GtfsFeed, TransitBuildSummary, TransitNetworkBuilder};
pub use raw_types::{FeedStop, FeedStopTime};
