//! Fixed-capacity moving average / standard deviation

use crate::math;
use crate::traits::ConfigError;

#[cfg(feature = "std")]
use std::collections::VecDeque;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;

/// Moving mean and standard deviation over the last `N` samples
///
/// Keeps the window in a ring buffer together with a running sum and sum of
/// squares, so both updates and queries are O(1). When the window is full the
/// oldest sample is evicted and subtracted from the running sums.
///
/// Windows are not mergeable: they describe temporal continuity inside one
/// track and are reset with [`clear`](SlidingWindow::clear) on every gap.
///
/// # Example
///
/// ```
/// use logstats::statistics::SlidingWindow;
///
/// let mut window = SlidingWindow::new(3).unwrap();
/// for v in [1.0, 2.0, 3.0, 4.0] {
///     window.update(v);
/// }
///
/// // Only 2, 3 and 4 remain
/// assert!((window.mean() - 3.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct SlidingWindow {
    capacity: usize,
    samples: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
}

impl SlidingWindow {
    /// Create an empty window holding at most `window_size` samples
    ///
    /// Fails with [`ConfigError::ZeroWindowSize`] when `window_size` is zero.
    pub fn new(window_size: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        Ok(Self {
            capacity: window_size,
            samples: VecDeque::with_capacity(window_size),
            sum: 0.0,
            sum_sq: 0.0,
        })
    }

    /// Push a sample, evicting the oldest one when full, and return the new mean
    pub fn update(&mut self, value: f64) -> f64 {
        if self.samples.len() == self.capacity {
            if let Some(evicted) = self.samples.pop_front() {
                self.sum -= evicted;
                self.sum_sq -= evicted * evicted;
            }
        }
        self.samples.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;

        self.mean()
    }

    /// Mean of the samples in the window, or 0.0 when empty
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    /// Population standard deviation of the window, or 0.0 when empty
    ///
    /// `sum_sq / n - mean²` can dip slightly below zero through rounding;
    /// that is clamped to zero before the square root.
    pub fn std_dev(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let n = self.samples.len() as f64;
        let mean = self.sum / n;
        let variance = self.sum_sq / n - mean * mean;
        math::sqrt(variance.max(0.0))
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.sum_sq = 0.0;
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the next update will evict a sample
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }
}
