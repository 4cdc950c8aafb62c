//! Great-circle distance shared by ingestion and itinerary decoding.
//!
//! Both call sites must agree on the formula and the radius, otherwise the
//! distances reported for an itinerary drift from the distances its edges were
//! weighted with. `geo`'s own haversine uses a slightly different mean radius,
//! so the formula lives here.

use geo::Point;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two `(lat, lon)` pairs given in degrees.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Haversine distance in meters between two points (`x` = lon, `y` = lat).
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    haversine(a.y(), a.x(), b.y(), b.x())
}

/// Position of a point on the unit sphere.
///
/// Chord length between two such positions is monotonic in great-circle
/// distance, so Euclidean nearest-neighbour search over them is exact.
pub(crate) fn unit_sphere(point: Point<f64>) -> [f64; 3] {
    let lat = point.y().to_radians();
    let lon = point.x().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Squared unit-sphere chord length spanning `meters` of great-circle distance.
pub(crate) fn chord_squared(meters: f64) -> f64 {
    let angle = (meters / EARTH_RADIUS_M).min(std::f64::consts::PI);
    let chord = 2.0 * (angle / 2.0).sin();
    chord * chord
}
