use std::path::Path;

use hashbrown::HashMap;
use log::{debug, info, warn};

use super::{
    parser::{deserialize_gtfs_file, parse_time},
    raw_types::{FeedStop, FeedStopTime},
};
use crate::{
    Error,
    loading::transfers::{link_stations_to_roads, repair_unlinked_stations},
    model::{Station, TripEvent},
    store::GraphStore,
};

/// Station and stop-time tables of one schedule feed
#[derive(Debug, Clone, Default)]
pub struct GtfsFeed {
    pub stations: Vec<Station>,
    pub stop_times: Vec<FeedStopTime>,
}

impl GtfsFeed {
    /// Reads `stops.txt` and `stop_times.txt` from a feed directory
    pub fn from_dir(dir: &Path) -> Result<Self, Error> {
        if !dir.is_dir() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("GTFS directory not found: {}", dir.display()),
            )));
        }

        let stops: Vec<FeedStop> = deserialize_gtfs_file(&dir.join("stops.txt"))?;
        let mut stop_times: Vec<FeedStopTime> = deserialize_gtfs_file(&dir.join("stop_times.txt"))?;
        stop_times.shrink_to_fit();

        let stations = create_stations(stops);
        info!(
            "Read {} stations and {} stop times from {}",
            stations.len(),
            stop_times.len(),
            dir.display()
        );
        Ok(Self {
            stations,
            stop_times,
        })
    }
}

fn create_stations(stops: Vec<FeedStop>) -> Vec<Station> {
    stops
        .into_iter()
        .filter_map(|stop| {
            let lat = stop.stop_lat.trim().parse::<f64>();
            let lon = stop.stop_lon.trim().parse::<f64>();
            match (lat, lon) {
                (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => {
                    Some(Station::new(stop.stop_id, stop.stop_name, lat, lon))
                }
                _ => {
                    warn!(
                        "Skipping stop '{}' with invalid coordinates ({}, {})",
                        stop.stop_id, stop.stop_lat, stop.stop_lon
                    );
                    None
                }
            }
        })
        .collect()
}

/// Counts of records written by one transit network build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitBuildSummary {
    pub stations: usize,
    pub trip_events: usize,
    /// Directed WALK_TO edges written by the radius join
    pub walk_links: usize,
    /// Stations linked to their nearest road node by the repair pass
    pub repaired: usize,
    /// Stations that still have no WALK_TO edge, only when there are no road nodes
    pub unrepaired: usize,
}

/// Writes stations, trip events and the pedestrian links connecting them to
/// the road network.
///
/// Steps run in order: stations, events, radius join, connectivity repair.
pub struct TransitNetworkBuilder<'a> {
    store: &'a dyn GraphStore,
    batch_size: usize,
    walk_radius_m: f64,
    walking_speed_mps: f64,
}

impl<'a> TransitNetworkBuilder<'a> {
    pub fn new(
        store: &'a dyn GraphStore,
        batch_size: usize,
        walk_radius_m: f64,
        walking_speed_mps: f64,
    ) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            walk_radius_m,
            walking_speed_mps,
        }
    }

    /// A malformed stop time fails only its own batch. The remaining batches,
    /// the radius join and the repair pass still run, then the first batch
    /// error is returned.
    pub fn build(&self, feed: &GtfsFeed) -> Result<TransitBuildSummary, Error> {
        let mut summary = TransitBuildSummary {
            stations: self.store.upsert_stations(&feed.stations)?,
            ..Default::default()
        };
        info!("Upserted {} stations", summary.stations);

        let stations: HashMap<&str, &Station> = feed
            .stations
            .iter()
            .map(|station| (station.id.as_str(), station))
            .collect();

        let mut failure: Option<Error> = None;
        for (idx, batch) in feed.stop_times.chunks(self.batch_size).enumerate() {
            match trip_events(batch, &stations) {
                Ok(events) => {
                    summary.trip_events += self.store.upsert_trip_events(&events)?;
                    debug!("Upserted trip event batch {idx} ({} rows)", batch.len());
                }
                Err(err) => {
                    warn!("Skipping trip event batch {idx}: {err}");
                    failure.get_or_insert(err);
                }
            }
        }
        info!("Upserted {} trip events", summary.trip_events);

        summary.walk_links = link_stations_to_roads(
            self.store,
            self.walk_radius_m,
            self.walking_speed_mps,
            self.batch_size,
        )?;
        let (repaired, unrepaired) = repair_unlinked_stations(self.store, self.walking_speed_mps)?;
        summary.repaired = repaired;
        summary.unrepaired = unrepaired;

        info!(
            "Transit network: {} walk links, {} stations repaired, {} unrepairable",
            summary.walk_links, summary.repaired, summary.unrepaired
        );
        match failure {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}

/// Converts a batch of stop times, failing on the first malformed row so no
/// part of the batch is written
fn trip_events(
    batch: &[FeedStopTime],
    stations: &HashMap<&str, &Station>,
) -> Result<Vec<TripEvent>, Error> {
    let mut events = Vec::with_capacity(batch.len());
    let mut unknown_stops = 0usize;

    for row in batch {
        let arrival_time = parse_time(&row.arrival_time)?;
        let departure_time = parse_time(&row.departure_time)?;
        let stop_sequence = row.stop_sequence.trim().parse::<u32>().map_err(|e| {
            Error::InvalidData(format!(
                "Invalid stop_sequence '{}' for trip '{}': {e}",
                row.stop_sequence, row.trip_id
            ))
        })?;

        let Some(station) = stations.get(row.stop_id.as_str()) else {
            unknown_stops += 1;
            continue;
        };

        events.push(TripEvent {
            id: TripEvent::event_id(&row.trip_id, stop_sequence),
            trip_id: row.trip_id.clone(),
            stop_id: row.stop_id.clone(),
            stop_sequence,
            arrival_time,
            departure_time,
            time: arrival_time,
            lat: station.lat,
            lon: station.lon,
            delay: None,
            actual_time: None,
        });
    }

    if unknown_stops > 0 {
        warn!("Skipped {unknown_stops} stop times referring to unknown stops");
    }
    Ok(events)
}
