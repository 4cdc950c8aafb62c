use std::path::Path;

use gtfs_realtime::FeedMessage;
use log::{debug, info, warn};
use prost::Message;

use crate::{Error, model::DelayUpdate, store::GraphStore};

/// Reads a binary GTFS-Realtime `FeedMessage` and extracts its stop delays
pub fn read_delay_updates(path: &Path) -> Result<Vec<DelayUpdate>, Error> {
    let bytes = std::fs::read(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to read real-time feed '{}': {}", path.display(), e),
        )
    })?;
    decode_delay_feed(&bytes)
}

/// Decodes a GTFS-Realtime feed into one update per stop time update.
///
/// The arrival delay is used, falling back to the departure delay. Updates
/// without a trip id, a stop id or either delay are skipped.
pub fn decode_delay_feed(bytes: &[u8]) -> Result<Vec<DelayUpdate>, Error> {
    let feed = FeedMessage::decode(bytes)?;

    let mut skipped = 0usize;
    let mut updates = Vec::new();
    for trip_update in feed.entity.iter().filter_map(|entity| entity.trip_update.as_ref()) {
        let Some(trip_id) = &trip_update.trip.trip_id else {
            skipped += trip_update.stop_time_update.len();
            continue;
        };
        for stop_time_update in &trip_update.stop_time_update {
            let delay = stop_time_update
                .arrival
                .as_ref()
                .and_then(|event| event.delay)
                .or_else(|| stop_time_update.departure.as_ref().and_then(|event| event.delay));
            match (&stop_time_update.stop_id, delay) {
                (Some(stop_id), Some(delay_secs)) => updates.push(DelayUpdate {
                    trip_id: trip_id.clone(),
                    stop_id: stop_id.clone(),
                    delay_secs,
                }),
                _ => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {skipped} stop time updates without trip, stop or delay");
    }
    info!(
        "Decoded {} delay updates from {} feed entities",
        updates.len(),
        feed.entity.len()
    );
    Ok(updates)
}

/// Applies delay updates to matching trip events.
///
/// Delays are informational: they set `delay` and `actual_time` but never
/// change edge costs, so no projection rebuild is needed.
pub fn apply_delay_updates(store: &dyn GraphStore, updates: &[DelayUpdate]) -> Result<usize, Error> {
    let touched = store.apply_delays(updates)?;
    if touched == 0 && !updates.is_empty() {
        warn!("None of {} delay updates matched a trip event", updates.len());
    } else {
        info!("Applied {} delay updates to {touched} trip events", updates.len());
    }
    Ok(touched)
}
