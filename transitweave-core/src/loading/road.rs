use hashbrown::HashSet;
use itertools::Itertools;
use log::{debug, info};

use super::osm::MapData;
use crate::{
    Error, geo_math,
    model::{RoadNode, RoadSegment, SpeedTable},
    store::GraphStore,
};

/// Counts of records written by one road network build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoadBuildSummary {
    pub nodes: usize,
    /// Directed segments, two per consecutive way node pair
    pub segments: usize,
}

/// Turns road map data into RoadNodes and bidirectional ROAD_SEGMENT edges
pub struct RoadNetworkBuilder<'a> {
    store: &'a dyn GraphStore,
    speeds: &'a SpeedTable,
    batch_size: usize,
}

impl<'a> RoadNetworkBuilder<'a> {
    pub fn new(store: &'a dyn GraphStore, speeds: &'a SpeedTable, batch_size: usize) -> Self {
        Self {
            store,
            speeds,
            batch_size: batch_size.max(1),
        }
    }

    pub fn build(&self, data: &MapData) -> Result<RoadBuildSummary, Error> {
        let mut nodes: Vec<RoadNode> = data
            .nodes
            .iter()
            .map(|(id, point)| RoadNode::new(id.to_string(), point.y(), point.x()))
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let segments = self.segments(data);

        let mut summary = RoadBuildSummary::default();
        for batch in nodes.chunks(self.batch_size) {
            summary.nodes += self.store.upsert_road_nodes(batch)?;
            debug!("Upserted road node batch of {}", batch.len());
        }
        for batch in segments.chunks(self.batch_size) {
            summary.segments += self.store.upsert_road_segments(batch)?;
            debug!("Upserted road segment batch of {}", batch.len());
        }

        info!(
            "Road network: {} nodes, {} directed segments from {} ways",
            summary.nodes,
            summary.segments,
            data.ways.len()
        );
        Ok(summary)
    }

    /// Both directions of every consecutive node pair whose nodes are known
    fn segments(&self, data: &MapData) -> Vec<RoadSegment> {
        let mut seen = HashSet::new();
        let mut segments = Vec::new();

        for way in &data.ways {
            let speed = self.speeds.speed_for(&way.highway);
            for (u, v) in way.nodes.iter().tuple_windows() {
                if u == v {
                    continue;
                }
                let (Some(&from), Some(&to)) = (data.nodes.get(u), data.nodes.get(v)) else {
                    continue;
                };
                let distance = geo_math::distance(from, to);
                let forward = RoadSegment::new(u.to_string(), v.to_string(), distance, speed);
                let backward = forward.reversed();
                for segment in [forward, backward] {
                    if seen.insert(segment.key()) {
                        segments.push(segment);
                    }
                }
            }
        }
        segments
    }
}
