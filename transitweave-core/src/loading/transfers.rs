use hashbrown::HashMap;
use log::{info, trace, warn};
use rayon::prelude::*;

use crate::{
    Error,
    model::{Station, WalkLink},
    store::GraphStore,
};

/// Links every station to each road node strictly closer than `radius_m`
/// with a symmetric WALK_TO pair, returning the number of directed links
/// written.
pub(crate) fn link_stations_to_roads(
    store: &dyn GraphStore,
    radius_m: f64,
    walking_speed_mps: f64,
    batch_size: usize,
) -> Result<usize, Error> {
    let stations = store.stations()?;
    info!(
        "Linking {} stations to road nodes within {radius_m} m",
        stations.len()
    );

    let per_station = stations
        .par_iter()
        .map(|station| {
            let nearby = store.road_nodes_within(station.point(), radius_m)?;
            trace!("Station {} has {} road nodes nearby", station.id, nearby.len());
            Ok::<_, Error>(
                nearby
                    .into_iter()
                    .flat_map(|snap| {
                        WalkLink::pair(&station.id, &snap.node_id, snap.distance, walking_speed_mps)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let links: Vec<WalkLink> = per_station.into_iter().flatten().collect();
    let mut written = 0;
    for batch in links.chunks(batch_size.max(1)) {
        written += store.upsert_walk_links(batch)?;
    }
    Ok(written)
}

/// Forces a WALK_TO pair between every station without one and its globally
/// nearest road node, whatever the distance.
///
/// Returns the number of stations repaired and the number left unlinked,
/// which is non-zero only when the graph has no road nodes.
pub(crate) fn repair_unlinked_stations(
    store: &dyn GraphStore,
    walking_speed_mps: f64,
) -> Result<(usize, usize), Error> {
    let unlinked = store.stations_without_walk_links()?;
    if unlinked.is_empty() {
        return Ok((0, 0));
    }

    let stations: HashMap<String, Station> = store
        .stations()?
        .into_iter()
        .map(|station| (station.id.clone(), station))
        .collect();

    let mut links = Vec::with_capacity(unlinked.len() * 2);
    let mut unrepaired = 0;
    for station_id in &unlinked {
        let Some(station) = stations.get(station_id) else {
            continue;
        };
        match store.nearest_road_node(station.point())? {
            Some(snap) => {
                trace!(
                    "Repairing station {station_id}: nearest road node {} at {:.0} m",
                    snap.node_id, snap.distance
                );
                links.extend(WalkLink::pair(
                    station_id,
                    &snap.node_id,
                    snap.distance,
                    walking_speed_mps,
                ));
            }
            None => unrepaired += 1,
        }
    }

    store.upsert_walk_links(&links)?;
    let repaired = links.len() / 2;
    if unrepaired > 0 {
        warn!("{unrepaired} stations have no road node to link to");
    }
    info!("Connectivity repair linked {repaired} isolated stations");
    Ok((repaired, unrepaired))
}
