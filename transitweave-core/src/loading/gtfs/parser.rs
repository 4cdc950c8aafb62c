use std::fs::File;
use std::path::Path;

use log::warn;

use crate::{Error, Time};

/// Reads every well-formed record of a GTFS table, skipping the rest.
///
/// A missing file or an unreadable header row fails the whole table.
pub fn deserialize_gtfs_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    let mut reader = csv::Reader::from_reader(file);
    reader.headers()?;

    let mut skipped = 0usize;
    let records = reader
        .deserialize()
        .filter_map(|record| record.inspect_err(|_| skipped += 1).ok())
        .collect::<Vec<T>>();

    if skipped > 0 {
        warn!("Skipped {skipped} unreadable rows in {}", path.display());
    }
    Ok(records)
}

/// Parse `HH:MM:SS` into seconds since service-day midnight.
///
/// Hours past 24 denote trips running after midnight and are kept as is.
pub fn parse_time(time_str: &str) -> Result<Time, Error> {
    let malformed = || Error::MalformedScheduleTime {
        value: time_str.to_string(),
    };

    let mut parts = time_str.trim().split(':');
    let mut next = || -> Result<Time, Error> {
        parts
            .next()
            .and_then(|p| p.trim().parse::<Time>().ok())
            .ok_or_else(malformed)
    };
    let (hours, minutes, seconds) = (next()?, next()?, next()?);
    if parts.next().is_some() {
        return Err(malformed());
    }

    hours
        .checked_mul(3600)
        .zip(minutes.checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m))
        .and_then(|t| t.checked_add(seconds))
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("00:00:00").unwrap(), 0);
        assert_eq!(parse_time("08:15:30").unwrap(), 8 * 3600 + 15 * 60 + 30);
        assert_eq!(parse_time("7:05:00").unwrap(), 7 * 3600 + 5 * 60);
        assert_eq!(parse_time(" 12:00:00 ").unwrap(), 43_200);
    }

    #[test]
    fn test_parse_time_after_midnight() {
        assert_eq!(parse_time("25:10:00").unwrap(), 90_600);
        assert!(parse_time("25:10:00").unwrap() > 86_400);
    }

    #[test]
    fn test_parse_time_malformed() {
        for value in ["", "08:15", "08:15:30:00", "8h15", "aa:bb:cc", "-1:00:00", "08::30"] {
            assert!(
                matches!(parse_time(value), Err(Error::MalformedScheduleTime { .. })),
                "{value:?} should be rejected"
            );
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct Row {
        id: String,
        value: u32,
    }

    #[test]
    fn test_deserialize_skips_bad_rows() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"id,value\na,1\nb,not-a-number\nc,3\n").unwrap();

        let rows: Vec<Row> = deserialize_gtfs_file(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "c");
        assert_eq!(rows[1].value, 3);
    }

    #[test]
    fn test_deserialize_rejects_unreadable_header() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, b',', b'x', b'\n']).unwrap();

        let result: Result<Vec<Row>, _> = deserialize_gtfs_file(file.path());
        assert!(matches!(result, Err(Error::CsvError(_))));
    }
}
