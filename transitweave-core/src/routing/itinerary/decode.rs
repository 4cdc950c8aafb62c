use itertools::Itertools;

use super::{Segment, SegmentMode};
use crate::{geo_math, routing::PathNode};

fn coord(node: &PathNode) -> [f64; 2] {
    [node.lat, node.lon]
}

/// A hop touching a trip event on either side rides transit, including the
/// boarding and alighting hops between a station and its events.
fn classify(prev: &PathNode, cur: &PathNode) -> SegmentMode {
    if prev.is_trip_event() || cur.is_trip_event() {
        SegmentMode::Transit
    } else {
        SegmentMode::Walk
    }
}

/// Splits a node path into mode-tagged segments.
///
/// Every hop extends the open segment with its arriving node. When the hop's
/// mode differs from the open segment's, that segment is closed and the next
/// one starts at the same node, so consecutive segments share their boundary
/// coordinate.
pub fn decode(nodes: &[PathNode]) -> Vec<Segment> {
    let Some(first) = nodes.first() else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut open = Segment::new(SegmentMode::Walk, coord(first));

    for (prev, cur) in nodes.iter().tuple_windows() {
        open.coords.push(coord(cur));

        let mode = classify(prev, cur);
        if mode != open.mode {
            let closed = std::mem::replace(&mut open, Segment::new(mode, coord(cur)));
            segments.push(closed);
        }
    }

    segments.push(open);
    segments
}

/// Great-circle length of the full node path, meters
pub fn total_distance(nodes: &[PathNode]) -> f64 {
    nodes
        .iter()
        .tuple_windows()
        .map(|(a, b)| geo_math::haversine(a.lat, a.lon, b.lat, b.lon))
        .sum()
}
