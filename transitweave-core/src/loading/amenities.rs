use std::path::Path;

use log::info;
use serde::{Deserialize, Deserializer};

use super::gtfs::deserialize_gtfs_file;
use crate::{
    Error,
    model::{Amenity, AmenityDetails, AmenityKind},
};

#[derive(Debug, Deserialize)]
struct EvPointRecord {
    id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    charger_type: String,
    #[serde(default)]
    sockets: u32,
    #[serde(default)]
    provider: String,
}

#[derive(Debug, Deserialize)]
struct BikeHubRecord {
    id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    capacity: u32,
    #[serde(default, deserialize_with = "deserialize_flag")]
    has_ebikes: bool,
}

/// Accepts `true/false`, `1/0` and `yes/no` in any case
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag '{other}'"))),
    }
}

/// Reads amenity points of one kind from a CSV file.
///
/// EV points: `id,lat,lon,charger_type,sockets,provider`.
/// Bike hubs: `id,lat,lon,capacity,has_ebikes`.
pub fn load_amenities(path: &Path, kind: AmenityKind) -> Result<Vec<Amenity>, Error> {
    let amenities: Vec<Amenity> = match kind {
        AmenityKind::EvPoint => deserialize_gtfs_file::<EvPointRecord>(path)?
            .into_iter()
            .map(|r| Amenity {
                id: r.id,
                lat: r.lat,
                lon: r.lon,
                details: AmenityDetails::EvPoint {
                    charger_type: r.charger_type,
                    sockets: r.sockets,
                    provider: r.provider,
                },
            })
            .collect(),
        AmenityKind::BikeHub => deserialize_gtfs_file::<BikeHubRecord>(path)?
            .into_iter()
            .map(|r| Amenity {
                id: r.id,
                lat: r.lat,
                lon: r.lon,
                details: AmenityDetails::BikeHub {
                    capacity: r.capacity,
                    has_ebikes: r.has_ebikes,
                },
            })
            .collect(),
    };

    info!("Read {} {kind} amenities from {}", amenities.len(), path.display());
    Ok(amenities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_ev_points() {
        let file = csv_file(
            "id,lat,lon,charger_type,sockets,provider\n\
             ev1,17.44,78.38,CCS2,4,Tata Power\n\
             ev2,not-a-number,78.39,CHAdeMO,2,Statiq\n",
        );
        let amenities = load_amenities(file.path(), AmenityKind::EvPoint).unwrap();

        assert_eq!(amenities.len(), 1);
        assert_eq!(amenities[0].kind(), AmenityKind::EvPoint);
        assert_eq!(
            amenities[0].details,
            AmenityDetails::EvPoint {
                charger_type: "CCS2".into(),
                sockets: 4,
                provider: "Tata Power".into(),
            }
        );
    }

    #[test]
    fn test_load_bike_hubs() {
        let file = csv_file(
            "id,lat,lon,capacity,has_ebikes\n\
             b1,17.40,78.47,20,yes\n\
             b2,17.41,78.48,12,0\n",
        );
        let amenities = load_amenities(file.path(), AmenityKind::BikeHub).unwrap();

        assert_eq!(amenities.len(), 2);
        assert_eq!(
            amenities[0].details,
            AmenityDetails::BikeHub {
                capacity: 20,
                has_ebikes: true
            }
        );
        assert!(matches!(
            amenities[1].details,
            AmenityDetails::BikeHub {
                has_ebikes: false,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_amenities(Path::new("/nonexistent/ev.csv"), AmenityKind::EvPoint).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
