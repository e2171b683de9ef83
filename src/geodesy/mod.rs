//! Geodesy helpers for turning position fixes into distances
//!
//! All angles are radians unless a function name says otherwise.
//!
//! # Example
//!
//! ```
//! use logstats::geodesy::{haversine, normalize_mpi_pi};
//!
//! // About 1.1 km along a meridian
//! let d = haversine(0.7, -0.15, 0.70017, -0.15);
//! assert!((d - 1083.0).abs() < 5.0);
//!
//! assert!((normalize_mpi_pi(3.5) - (3.5 - 2.0 * std::f64::consts::PI)).abs() < 1e-12);
//! ```

pub mod wgs84;

use core::f64::consts::TAU;

use crate::math;

/// Mean Earth radius used by [`haversine`] (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in metres between two points given in radians
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let sin_dlat = math::sin(dlat / 2.0);
    let sin_dlon = math::sin(dlon / 2.0);
    let a = sin_dlat * sin_dlat + math::cos(lat1) * math::cos(lat2) * sin_dlon * sin_dlon;
    let c = 2.0 * math::atan2(math::sqrt(a), math::sqrt(1.0 - a));

    EARTH_RADIUS_KM * c * 1000.0
}

/// Great-circle distance in metres between two points given in degrees
pub fn haversine_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine(
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    )
}

/// Initial great-circle bearing from the first to the second point, in `[0, 2π)`
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlon = lon2 - lon1;
    let x = math::cos(lat2) * math::sin(dlon);
    let y = math::cos(lat1) * math::sin(lat2)
        - math::sin(lat1) * math::cos(lat2) * math::cos(dlon);
    normalize_0_2pi(math::atan2(x, y))
}

/// Wrap an angle into `[0, 2π)`
pub fn normalize_0_2pi(angle: f64) -> f64 {
    let wrapped = math::rem_euclid(angle, TAU);
    // rem_euclid of a tiny negative can round up to exactly 2π
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle into `(-π, π]`
///
/// Goes through `atan2(sin, cos)` rather than a modulo so that signed
/// differences of nearly opposite angles come out right.
pub fn normalize_mpi_pi(angle: f64) -> f64 {
    math::atan2(math::sin(angle), math::cos(angle))
}

/// A geodetic position: latitude/longitude in radians, depth in metres
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, depth: f64) -> Self {
        Self { lat, lon, depth }
    }

    /// This point moved by a local North/East/Down offset (m)
    pub fn displaced(&self, north: f64, east: f64, down: f64) -> Self {
        let (lat, lon, depth) = wgs84::displace(self.lat, self.lon, self.depth, north, east, down);
        Self { lat, lon, depth }
    }

    /// Great-circle distance to another point (m), ignoring depth
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine(self.lat, self.lon, other.lat, other.lon)
    }

    /// Initial bearing towards another point, in `[0, 2π)`
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing(self.lat, self.lon, other.lat, other.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_haversine_zero() {
        assert_eq!(haversine(0.5, 0.1, 0.5, 0.1), 0.0);
    }

    #[test]
    fn test_haversine_quarter_meridian() {
        // Equator to pole is a quarter of the great circle
        let d = haversine(0.0, 0.0, FRAC_PI_2, 0.0);
        let expected = EARTH_RADIUS_KM * 1000.0 * FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_degrees_matches_radians() {
        let a = haversine_degrees(41.18, -8.70, 41.19, -8.68);
        let b = haversine(
            41.18f64.to_radians(),
            (-8.70f64).to_radians(),
            41.19f64.to_radians(),
            (-8.68f64).to_radians(),
        );
        assert!((a - b).abs() < 1e-9);
        assert!(a > 1000.0 && a < 3000.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let d1 = haversine(0.5, 0.1, 0.5001, 0.1001);
        let d2 = haversine(0.5001, 0.1001, 0.5, 0.1);
        assert!((d1 - d2).abs() < 1e-9);
        assert!(d1 > 10.0 && d1 < 1000.0);
    }

    #[test]
    fn test_bearing_cardinal() {
        assert!(bearing(0.0, 0.0, 0.01, 0.0).abs() < 1e-9);
        assert!((bearing(0.0, 0.0, 0.0, 0.01) - FRAC_PI_2).abs() < 1e-9);
        assert!((bearing(0.0, 0.0, -0.01, 0.0) - PI).abs() < 1e-9);
        assert!((bearing(0.0, 0.0, 0.0, -0.01) - 3.0 * FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_0_2pi() {
        assert!((normalize_0_2pi(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_0_2pi(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!(normalize_0_2pi(-1e-18) < TAU);
    }

    #[test]
    fn test_normalize_mpi_pi() {
        assert!((normalize_mpi_pi(3.0 * FRAC_PI_2) + FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_mpi_pi(-3.0 * FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        // Difference across the ±π seam stays small
        let diff = normalize_mpi_pi(-3.1 - 3.1);
        assert!((diff - (TAU - 6.2)).abs() < 1e-12);
    }

    #[test]
    fn test_geopoint_displaced() {
        let origin = GeoPoint::new(0.5, 0.1, 0.0);
        let moved = origin.displaced(100.0, 0.0, 0.0);
        assert!((origin.distance_to(&moved) - 100.0).abs() < 0.5);
        assert!(origin.bearing_to(&moved) < 1e-6 || origin.bearing_to(&moved) > TAU - 1e-6);
    }
}
