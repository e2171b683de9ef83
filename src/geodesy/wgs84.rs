//! WGS-84 ellipsoid conversions
//!
//! Positions follow the navigation convention used by the vehicle logs:
//! geodetic latitude/longitude in radians and a *depth* in metres that is
//! positive below the ellipsoid (the negative of the ellipsoidal height).

use crate::math;

/// Semi-major axis (m)
pub const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// Semi-minor axis (m)
pub const SEMI_MINOR_AXIS: f64 = 6_356_752.3142;
/// First eccentricity squared
pub const ECCENTRICITY_SQ: f64 = 0.006_694_379_990_13;
/// Flattening
pub const FLATTENING: f64 = 0.003_352_810_664_747_5;

/// Convergence threshold on successive height estimates (m)
const FROM_ECEF_TOLERANCE: f64 = 1e-4;
/// Hard stop for the latitude fixed-point iteration
const FROM_ECEF_MAX_ITERATIONS: usize = 64;
/// Denominator of the first latitude estimate in [`from_ecef`]
///
/// Not a physically meaningful guess: `atan2(z / p, 0.01)` starts the
/// iteration near the pole. It converges for terrestrial positions with the
/// WGS-84 ellipsoid, but may misbehave near the poles or for very large
/// depths. Kept as is so results stay comparable with existing reports.
const FROM_ECEF_SEED_DENOMINATOR: f64 = 0.01;

/// Earth-centred, Earth-fixed Cartesian coordinates (m)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Radius of curvature in the prime vertical at the given latitude
pub fn prime_vertical_radius(lat: f64) -> f64 {
    let s = math::sin(lat);
    SEMI_MAJOR_AXIS / math::sqrt(1.0 - ECCENTRICITY_SQ * s * s)
}

/// Convert geodetic coordinates to ECEF
pub fn to_ecef(lat: f64, lon: f64, depth: f64) -> Ecef {
    let (sin_lat, cos_lat) = (math::sin(lat), math::cos(lat));
    let (sin_lon, cos_lon) = (math::sin(lon), math::cos(lon));
    let rn = prime_vertical_radius(lat);

    Ecef {
        x: (rn - depth) * cos_lat * cos_lon,
        y: (rn - depth) * cos_lat * sin_lon,
        z: ((1.0 - ECCENTRICITY_SQ) * rn - depth) * sin_lat,
    }
}

/// Convert ECEF coordinates back to geodetic `(lat, lon, depth)`
///
/// Fixed-point iteration on latitude, stopping once two successive height
/// estimates agree to within 0.1 mm.
pub fn from_ecef(ecef: &Ecef) -> (f64, f64, f64) {
    let p = math::sqrt(ecef.x * ecef.x + ecef.y * ecef.y);
    let lon = math::atan2(ecef.y, ecef.x);
    let num = ecef.z / p;

    let mut lat = math::atan2(num, FROM_ECEF_SEED_DENOMINATOR);
    let mut n = prime_vertical_radius(lat);
    let mut height = p / math::cos(lat) - n;
    let mut previous = -1e-9;

    for _ in 0..FROM_ECEF_MAX_ITERATIONS {
        if math::abs(height - previous) <= FROM_ECEF_TOLERANCE {
            break;
        }
        previous = height;

        let den = 1.0 - ECCENTRICITY_SQ * n / (n + height);
        lat = math::atan2(num, den);
        n = prime_vertical_radius(lat);
        height = p / math::cos(lat) - n;
    }

    (lat, lon, -height)
}

/// North/East/Down offset of the second point in the local tangent frame of
/// the first one (m)
pub fn displacement(
    lat1: f64,
    lon1: f64,
    depth1: f64,
    lat2: f64,
    lon2: f64,
    depth2: f64,
) -> [f64; 3] {
    let a = to_ecef(lat1, lon1, depth1);
    let b = to_ecef(lat2, lon2, depth2);
    let (ox, oy, oz) = (b.x - a.x, b.y - a.y, b.z - a.z);

    let (slat, clat) = (math::sin(lat1), math::cos(lat1));
    let (slon, clon) = (math::sin(lon1), math::cos(lon1));

    [
        -slat * clon * ox - slat * slon * oy + clat * oz,
        -slon * ox + clon * oy,
        depth2 - depth1,
    ]
}

/// Apply a North/East/Down offset (m) to a geodetic position
///
/// Inverse of [`displacement`]: the offset is rotated out of the local
/// tangent frame, added in ECEF and converted back.
pub fn displace(lat: f64, lon: f64, depth: f64, north: f64, east: f64, down: f64) -> (f64, f64, f64) {
    if north == 0.0 && east == 0.0 && down == 0.0 {
        return (lat, lon, depth);
    }

    let origin = to_ecef(lat, lon, depth);
    let (slat, clat) = (math::sin(lat), math::cos(lat));
    let (slon, clon) = (math::sin(lon), math::cos(lon));

    let moved = Ecef {
        x: origin.x - slat * clon * north - slon * east - clat * clon * down,
        y: origin.y - slat * slon * north + clon * east - clat * slon * down,
        z: origin.z + clat * north - slat * down,
    };

    from_ecef(&moved)
}
