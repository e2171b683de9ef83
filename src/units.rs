//! Unit conversion constants used by the reports

/// Metres in one nautical mile
pub const NM_TO_METERS: f64 = 1852.0;
pub const METERS_TO_NM: f64 = 1.0 / NM_TO_METERS;

/// Knots in one metre per second
pub const MPS_TO_KNOTS: f64 = 1.943_844_49;
pub const KNOTS_TO_MPS: f64 = 1.0 / MPS_TO_KNOTS;

/// Convert metres per second to knots
#[inline]
pub fn mps_to_knots(mps: f64) -> f64 {
    mps * MPS_TO_KNOTS
}

/// Convert metres to nautical miles
#[inline]
pub fn meters_to_nm(meters: f64) -> f64 {
    meters * METERS_TO_NM
}
