//! Spherical-earth helpers shared by every stage of the matcher
//!
//! All distances use a sphere of radius 6371 km. This is fixed system-wide so
//! that candidate filtering and matching agree on every distance they compute.

use crate::domain::Coordinate;

/// Earth radius used for every haversine distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Meters per degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = 111320.0;

/// Smallest cos(latitude) used when scaling longitude degrees.
/// Keeps the conversion finite at the poles.
pub const MIN_COS_LAT: f64 = 1e-9;

/// Degrees per meter along each axis at some latitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeScale {
    pub per_lat_deg: f64,
    pub per_lng_deg: f64,
}

/// Great-circle distance in kilometres (haversine)
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from `a` to `b`, in [0, 360)
///
/// Returns 0 when `a == b` (atan2 of two zeros).
pub fn bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wrap an angle into [0, 360)
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Conversion factors from meters to degrees at `latitude_deg`
pub fn meters_to_degrees(latitude_deg: f64) -> DegreeScale {
    let cos_lat = latitude_deg.to_radians().cos().max(MIN_COS_LAT);

    DegreeScale {
        per_lat_deg: 1.0 / METERS_PER_DEGREE,
        per_lng_deg: 1.0 / (METERS_PER_DEGREE * cos_lat),
    }
}
