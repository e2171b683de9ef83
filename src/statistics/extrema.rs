//! Running minimum / maximum

use crate::traits::{Accumulator, MergeError};

/// Minimum and maximum of a stream
///
/// NaN samples are ignored. Merging takes the min of the minima and the max
/// of the maxima.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extrema {
    min: f64,
    max: f64,
    count: u64,
}

impl Default for Extrema {
    fn default() -> Self {
        Self::new()
    }
}

impl Extrema {
    pub fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }

    /// Record a sample
    pub fn update(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.count += 1;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Smallest sample seen
    pub fn min(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    /// Largest sample seen
    pub fn max(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    /// `max - min` when both ends are finite
    pub fn amplitude(&self) -> Option<f64> {
        match (self.min(), self.max()) {
            (Some(lo), Some(hi)) if lo.is_finite() && hi.is_finite() => Some(hi - lo),
            _ => None,
        }
    }

    /// Smallest sample, or NaN when nothing was seen
    pub fn min_or_nan(&self) -> f64 {
        self.min().unwrap_or(f64::NAN)
    }

    /// Largest sample, or NaN when nothing was seen
    pub fn max_or_nan(&self) -> f64 {
        self.max().unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Fold another tracker into this one
    pub fn merge_with(&mut self, other: &Self) -> &mut Self {
        if other.count > 0 {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
            self.count += other.count;
        }
        self
    }
}

impl Accumulator for Extrema {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut ext = Extrema::new();
        for v in [3.0, -1.0, 7.5, 2.0] {
            ext.update(v);
        }
        assert_eq!(ext.min(), Some(-1.0));
        assert_eq!(ext.max(), Some(7.5));
        assert_eq!(ext.amplitude(), Some(8.5));
    }

    #[test]
    fn test_empty() {
        let ext = Extrema::new();
        assert_eq!(ext.min(), None);
        assert_eq!(ext.max(), None);
        assert_eq!(ext.amplitude(), None);
        assert!(ext.min_or_nan().is_nan());
    }

    #[test]
    fn test_nan_ignored() {
        let mut ext = Extrema::new();
        ext.update(f64::NAN);
        assert!(ext.is_empty());
        ext.update(1.0);
        ext.update(f64::NAN);
        assert_eq!(ext.len(), 1);
        assert_eq!(ext.max(), Some(1.0));
    }

    #[test]
    fn test_infinite_sample_has_no_amplitude() {
        let mut ext = Extrema::new();
        ext.update(1.0);
        ext.update(f64::INFINITY);
        assert_eq!(ext.max(), Some(f64::INFINITY));
        assert_eq!(ext.amplitude(), None);
    }

    #[test]
    fn test_merge() {
        let mut a = Extrema::new();
        let mut b = Extrema::new();
        a.update(1.0);
        a.update(4.0);
        b.update(-2.0);
        b.update(3.0);

        a.merge(&b).unwrap();
        assert_eq!(a.min(), Some(-2.0));
        assert_eq!(a.max(), Some(4.0));
        assert_eq!(a.len(), 4);

        let before = a.clone();
        a.merge_with(&Extrema::new());
        assert_eq!(a, before);
    }
}
