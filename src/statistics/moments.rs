//! Running arithmetic mean and standard deviation
//!
//! Computes streaming moments using Welford's numerically stable online algorithm.
//! Supports merging so per-log moments can be folded into a batch aggregate.

use crate::math;
use crate::traits::{Accumulator, MergeError};

/// Running mean / standard deviation using Welford's algorithm
///
/// Keeps the count, running mean and the sum of squared deviations (M2)
/// instead of the raw samples, so memory is O(1) regardless of log length.
/// Merging two accumulators is equivalent to concatenating their sample
/// streams.
///
/// # Example
///
/// ```
/// use logstats::statistics::MeanStats;
///
/// let mut stats = MeanStats::new();
///
/// for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     stats.update(value);
/// }
///
/// assert!((stats.mean() - 5.0).abs() < 0.001);
/// assert!((stats.std_dev() - 2.0).abs() < 0.001);
/// ```
///
/// # Merging
///
/// ```
/// use logstats::statistics::MeanStats;
///
/// let mut first_log = MeanStats::new();
/// let mut second_log = MeanStats::new();
///
/// for v in [1.0, 2.0, 3.0] {
///     first_log.update(v);
/// }
/// for v in [4.0, 5.0, 6.0] {
///     second_log.update(v);
/// }
///
/// first_log.merge_with(&second_log);
/// assert!((first_log.mean() - 3.5).abs() < 0.001);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeanStats {
    /// Number of values seen
    count: u64,
    /// Running mean
    mean: f64,
    /// Sum of squared differences from mean (M2 in Welford's algorithm)
    m2: f64,
}

impl MeanStats {
    /// Create a new empty accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Add a value and return the updated mean
    ///
    /// NaN values are ignored to prevent poisoning the statistics.
    pub fn update(&mut self, value: f64) -> f64 {
        if value.is_nan() {
            return self.mean();
        }

        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.mean
    }

    /// Get the number of values
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean, or 0.0 when no values were seen
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Population variance, or 0.0 with fewer than two values
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0)
        }
    }

    /// Population standard deviation, or 0.0 with fewer than two values
    pub fn std_dev(&self) -> f64 {
        math::sqrt(self.variance())
    }

    /// Sum of all values
    pub fn sum(&self) -> f64 {
        self.mean * self.count as f64
    }

    /// Merge another accumulator into this one
    ///
    /// Uses Chan et al.'s parallel algorithm for combining moments.
    /// Merging an empty accumulator leaves `self` untouched.
    pub fn merge_with(&mut self, other: &Self) -> &mut Self {
        if other.count == 0 {
            return self;
        }

        if self.count == 0 {
            *self = other.clone();
            return self;
        }

        let combined_count = self.count + other.count;
        let delta = other.mean - self.mean;

        let combined_mean = self.mean + delta * (other.count as f64 / combined_count as f64);

        let combined_m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64 * other.count as f64 / combined_count as f64);

        self.count = combined_count;
        self.mean = combined_mean;
        self.m2 = combined_m2;
        self
    }
}

impl Accumulator for MeanStats {
    fn push(&mut self, value: f64) {
        self.update(value);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        self.merge_with(other);
        Ok(())
    }

    fn clear(&mut self) {
        *self = Self::new();
    }

    fn count(&self) -> u64 {
        self.count
    }
}
