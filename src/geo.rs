//! Great-circle distance and geofence membership
//!
//! Coordinates are (latitude, longitude) in degrees. Distances use the
//! haversine formula on a spherical Earth, which is within a few meters of
//! geodesic results at geofence scale (tens to hundreds of meters).

/// Mean Earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Great-circle distance between two points, in meters
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Whether `point` lies within `radius_meters` of `center`.
///
/// Fails closed: malformed coordinates (NaN, infinities) produce a
/// non-finite distance and are reported as out of range rather than
/// propagating an error.
pub fn is_within_radius(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    let distance = distance_meters(point, center);
    if !distance.is_finite() {
        tracing::warn!(
            "geofence distance computation produced {} for ({}, {}) vs ({}, {})",
            distance,
            point.latitude,
            point.longitude,
            center.latitude,
            center.longitude
        );
        return false;
    }
    distance <= radius_meters
}
