use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use geo::Point;
use hashbrown::HashMap;
use log::info;
use serde::Deserialize;

use super::{MapData, MapDataProvider, OsmWay};
use crate::{Error, model::BoundingBox};

/// Classification assumed for ways returned without a `highway` tag
const UNTAGGED_HIGHWAY: &str = "unclassified";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Reads a saved Overpass API response (`[out:json]`) for a
/// `way["highway"](bbox); >;` query.
///
/// Nodes outside the requested box are dropped, so a response saved for a
/// wider area is cut down to the configured one.
#[derive(Debug, Clone)]
pub struct OverpassJsonSource {
    path: PathBuf,
}

impl OverpassJsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(response: OverpassResponse, bbox: &BoundingBox) -> MapData {
        let mut data = MapData::default();
        for element in response.elements {
            match element {
                OverpassElement::Node { id, lat, lon } => {
                    let point = Point::new(lon, lat);
                    if bbox.contains(&point) {
                        data.nodes.insert(id, point);
                    }
                }
                OverpassElement::Way { id, nodes, mut tags } => {
                    let highway = tags
                        .remove("highway")
                        .unwrap_or_else(|| UNTAGGED_HIGHWAY.to_string());
                    data.ways.push(OsmWay { id, highway, nodes });
                }
                OverpassElement::Other => {}
            }
        }
        data.retain_way_nodes();
        data
    }
}

impl MapDataProvider for OverpassJsonSource {
    fn name(&self) -> String {
        format!("Overpass response '{}'", self.path.display())
    }

    fn fetch(&self, bbox: &BoundingBox) -> Result<MapData, Error> {
        let file = File::open(&self.path)?;
        let response: OverpassResponse = serde_json::from_reader(BufReader::new(file))?;
        let data = Self::parse(response, bbox);
        info!(
            "Read {} ways and {} nodes from {}",
            data.ways.len(),
            data.nodes.len(),
            self.path.display()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RESPONSE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "way", "id": 10, "nodes": [1, 2, 3], "tags": {"highway": "primary", "name": "Main"}},
            {"type": "way", "id": 11, "nodes": [3, 4]},
            {"type": "relation", "id": 99, "members": []},
            {"type": "node", "id": 1, "lat": 17.0, "lon": 78.0},
            {"type": "node", "id": 2, "lat": 17.001, "lon": 78.0},
            {"type": "node", "id": 3, "lat": 17.002, "lon": 78.0},
            {"type": "node", "id": 4, "lat": 17.003, "lon": 78.0},
            {"type": "node", "id": 5, "lat": 17.5, "lon": 78.5}
        ]
    }"#;

    fn bbox() -> BoundingBox {
        BoundingBox::new(16.9, 77.9, 17.6, 78.6)
    }

    #[test]
    fn test_parse_response() {
        let response: OverpassResponse = serde_json::from_str(RESPONSE).unwrap();
        let data = OverpassJsonSource::parse(response, &bbox());

        assert_eq!(data.ways.len(), 2);
        assert_eq!(data.ways[0].highway, "primary");
        assert_eq!(data.ways[1].highway, "unclassified");
        // Node 5 belongs to no way
        assert_eq!(data.nodes.len(), 4);
        assert_eq!(data.nodes[&2], Point::new(78.0, 17.001));
    }

    #[test]
    fn test_fetch_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RESPONSE.as_bytes()).unwrap();

        let source = OverpassJsonSource::new(file.path());
        let data = source.fetch(&bbox()).unwrap();
        assert_eq!(data.ways.len(), 2);
    }

    #[test]
    fn test_nodes_outside_bbox_are_dropped() {
        let response: OverpassResponse = serde_json::from_str(RESPONSE).unwrap();
        // Cuts off nodes 3 and 4
        let narrow = BoundingBox::new(16.9, 77.9, 17.0015, 78.1);
        let data = OverpassJsonSource::parse(response, &narrow);

        let mut ids: Vec<i64> = data.nodes.keys().copied().collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        assert!(!data.nodes.contains_key(&5));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<html>rate limited</html>").unwrap();

        let source = OverpassJsonSource::new(file.path());
        assert!(matches!(
            source.fetch(&BoundingBox::default()),
            Err(Error::JsonError(_))
        ));
    }
}
