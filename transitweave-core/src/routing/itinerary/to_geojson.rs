use geojson::FeatureCollection;
use serde_json::{Value, json};

use super::{Itinerary, Segment};
use crate::Error;

impl Itinerary {
    /// Converts the itinerary to a `GeoJSON` `FeatureCollection`, one feature
    /// per segment in travel order.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features: Vec<Value> = self
            .segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| segment.to_feature(idx))
            .collect();

        let value = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        serde_json::from_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

impl Segment {
    fn geometry(&self) -> Value {
        // Segments store [lat, lon]; GeoJSON positions are [lon, lat]
        let positions: Vec<[f64; 2]> = self.coords.iter().map(|&[lat, lon]| [lon, lat]).collect();

        match positions.as_slice() {
            [single] => json!({ "type": "Point", "coordinates": single }),
            _ => json!({ "type": "LineString", "coordinates": positions }),
        }
    }

    fn to_feature(&self, idx: usize) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.geometry(),
            "properties": {
                "mode": self.mode.as_str(),
                "segment_index": idx,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::SegmentMode;

    fn itinerary() -> Itinerary {
        Itinerary {
            segments: vec![
                Segment {
                    mode: SegmentMode::Walk,
                    coords: vec![[17.0, 78.0], [17.1, 78.1]],
                },
                Segment {
                    mode: SegmentMode::Transit,
                    coords: vec![[17.1, 78.1]],
                },
            ],
            total_cost: 60.0,
            total_distance: 15_000.0,
        }
    }

    #[test]
    fn test_features_per_segment() {
        let collection = itinerary().to_geojson().unwrap();
        assert_eq!(collection.features.len(), 2);

        let value = serde_json::to_value(&collection).unwrap();
        let walk = &value["features"][0];
        assert_eq!(walk["properties"]["mode"], "WALK");
        assert_eq!(walk["geometry"]["type"], "LineString");
        assert_eq!(walk["geometry"]["coordinates"][0], json!([78.0, 17.0]));

        let transit = &value["features"][1];
        assert_eq!(transit["properties"]["mode"], "TRANSIT");
        assert_eq!(transit["properties"]["segment_index"], 1);
        assert_eq!(transit["geometry"]["type"], "Point");
    }

    #[test]
    fn test_no_route_is_empty_collection() {
        let json = Itinerary::no_route().to_geojson_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_output_parses_as_geojson() {
        let json = itinerary().to_geojson_string().unwrap();
        match json.parse::<geojson::GeoJson>().unwrap() {
            geojson::GeoJson::FeatureCollection(collection) => {
                assert_eq!(collection.features.len(), 2);
                assert!(collection.features.iter().all(|f| f.geometry.is_some()));
                assert_eq!(
                    collection.features[1].property("mode"),
                    Some(&json!("TRANSIT"))
                );
            }
            other => panic!("expected a feature collection, got {other:?}"),
        }
    }
}
