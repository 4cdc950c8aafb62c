use std::path::PathBuf;

use geo::Point;
use log::info;
use osmpbf::{Element, ElementReader};

use super::{MapData, MapDataProvider, OsmWay};
use crate::{Error, model::BoundingBox};

/// Reads `highway` ways from an OSM PBF extract
#[derive(Debug, Clone)]
pub struct PbfMapSource {
    path: PathBuf,
}

impl PbfMapSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MapDataProvider for PbfMapSource {
    fn name(&self) -> String {
        format!("OSM PBF '{}'", self.path.display())
    }

    fn fetch(&self, bbox: &BoundingBox) -> Result<MapData, Error> {
        let reader = ElementReader::from_path(&self.path).map_err(|e| {
            Error::InvalidData(format!("Failed to open '{}': {e}", self.path.display()))
        })?;

        let mut data = MapData::default();
        let mut keep_node = |id: i64, lat: f64, lon: f64| {
            let point = Point::new(lon, lat);
            if bbox.contains(&point) {
                data.nodes.insert(id, point);
            }
        };
        let mut ways = Vec::new();

        reader
            .for_each(|element| match element {
                Element::Node(node) => keep_node(node.id(), node.lat(), node.lon()),
                Element::DenseNode(node) => keep_node(node.id(), node.lat(), node.lon()),
                Element::Way(way) => {
                    if let Some((_, highway)) = way.tags().find(|(key, _)| *key == "highway") {
                        ways.push(OsmWay {
                            id: way.id(),
                            highway: highway.to_string(),
                            nodes: way.refs().collect(),
                        });
                    }
                }
                Element::Relation(_) => {}
            })
            .map_err(|e| Error::InvalidData(format!("Failed to read '{}': {e}", self.path.display())))?;

        data.ways = ways;
        data.retain_way_nodes();
        info!(
            "Read {} highway ways and {} nodes inside the bounding box from {}",
            data.ways.len(),
            data.nodes.len(),
            self.path.display()
        );
        Ok(data)
    }
}
