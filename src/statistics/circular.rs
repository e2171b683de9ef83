//! Circular (directional) mean and standard deviation
//!
//! Angles wrap around, so the arithmetic mean of 359° and 1° is 180° while
//! the intended answer is 0°. Averaging the unit vectors `(cos θ, sin θ)`
//! instead gives the correct direction, and the length of the averaged
//! vector measures dispersion.

use core::f64::consts::TAU;

use crate::math;
use crate::traits::{Accumulator, MergeError};

#[cfg(feature = "std")]
use std::string::ToString;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::string::ToString;

/// Resultant lengths below this are reported as exactly zero
///
/// Summing sines/cosines of perfectly symmetric samples leaves residue of
/// the order of 1e-16 rather than zero.
const RESULTANT_EPSILON: f64 = 1e-12;

/// Unit convention for angles fed to and returned by a [`CircularMean`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// Lowercase unit name
    pub fn name(&self) -> &'static str {
        match self {
            AngleUnit::Radians => "radians",
            AngleUnit::Degrees => "degrees",
        }
    }

    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Radians => angle,
            AngleUnit::Degrees => angle.to_radians(),
        }
    }

    fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Radians => angle,
            AngleUnit::Degrees => angle.to_degrees(),
        }
    }
}

impl core::fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Running circular mean via sine/cosine accumulation
///
/// The unit convention is fixed at construction and never mixed: samples are
/// read in that unit and results are returned in it.
///
/// # Example
///
/// ```
/// use logstats::statistics::CircularMean;
///
/// let mut heading = CircularMean::degrees();
/// heading.update(350.0);
/// heading.update(10.0);
///
/// // The mean lies on the short arc through north, not at 180°
/// assert!(heading.mean().abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircularMean {
    unit: AngleUnit,
    sin_sum: f64,
    cos_sum: f64,
    count: u64,
}

impl Default for CircularMean {
    fn default() -> Self {
        Self::radians()
    }
}

impl CircularMean {
    /// Create an empty accumulator with the given unit convention
    pub fn new(unit: AngleUnit) -> Self {
        Self {
            unit,
            sin_sum: 0.0,
            cos_sum: 0.0,
            count: 0,
        }
    }

    /// Create an accumulator working in radians
    pub fn radians() -> Self {
        Self::new(AngleUnit::Radians)
    }

    /// Create an accumulator working in degrees
    pub fn degrees() -> Self {
        Self::new(AngleUnit::Degrees)
    }

    /// The unit convention of this accumulator
    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// Number of samples
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add an angle and return the updated circular mean
    ///
    /// The angle is normalized into `[0, 2π)` before accumulation.
    /// NaN angles are ignored.
    pub fn update(&mut self, angle: f64) -> f64 {
        if angle.is_nan() {
            return self.mean();
        }

        let rad = math::rem_euclid(self.unit.to_radians(angle), TAU);
        self.sin_sum += math::sin(rad);
        self.cos_sum += math::cos(rad);
        self.count += 1;

        self.mean()
    }

    /// Circular mean in the configured unit, or 0.0 when empty
    ///
    /// The result lies in `(-π, π]` (or `(-180, 180]` degrees).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = math::atan2(self.sin_sum / n, self.cos_sum / n);
        self.unit.from_radians(mean)
    }

    /// Mean resultant length in `[0, 1]`
    ///
    /// 1.0 when every sample points the same way, 0.0 when the samples
    /// cancel out (or when there are none).
    pub fn radius(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        let s = self.sin_sum / n;
        let c = self.cos_sum / n;
        let r = math::sqrt(s * s + c * c);
        if r < RESULTANT_EPSILON {
            0.0
        } else {
            r.min(1.0)
        }
    }

    /// Circular standard deviation `sqrt(-2 ln R)` in the configured unit
    ///
    /// Returns `f64::INFINITY` when the resultant length is zero: uniformly
    /// spread samples have no meaningful spread value, and callers rely on
    /// this sentinel.
    pub fn std_dev(&self) -> f64 {
        let r = self.radius();
        if r == 0.0 {
            return f64::INFINITY;
        }
        // ln(1.0) can round to a tiny negative when r is 1 - ulp
        let sd = math::sqrt((-2.0 * math::ln(r)).max(0.0));
        self.unit.from_radians(sd)
    }

    /// Merge another accumulator into this one
    ///
    /// Fails when the unit conventions differ; the accumulators are never
    /// silently converted.
    pub fn merge_with(&mut self, other: &Self) -> Result<&mut Self, MergeError> {
        if self.unit != other.unit {
            return Err(MergeError::IncompatibleConfig {
                expected: self.unit.name().to_string(),
                found: other.unit.name().to_string(),
            });
        }
        self.sin_sum += other.sin_sum;
        self.cos_sum += other.cos_sum;
        self.count += other.count;
        Ok(self)
    }

    /// Reset to empty, keeping the unit convention
    pub fn clear(&mut self) {
        *self = Self::new(self.unit);
    }
}

impl Accumulator for CircularMean {
    fn push(&mut self, value: f64) {
        self.update(value);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        self.merge_with(other).map(|_| ())
    }

    fn clear(&mut self) {
        CircularMean::clear(self);
    }

    fn count(&self) -> u64 {
        self.count
    }
}
