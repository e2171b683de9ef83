//! Streaming numeric accumulators
//!
//! This module provides the single-pass, constant-memory building blocks the
//! log aggregator is made of:
//!
//! - [`MeanStats`]: arithmetic mean and population standard deviation
//! - [`CircularMean`]: mean and spread of angles, robust to wraparound
//! - [`SlidingWindow`]: moving mean / standard deviation over the last N samples
//! - [`Extrema`]: running minimum and maximum
//!
//! # Example
//!
//! ```
//! use logstats::statistics::{CircularMean, Extrema, MeanStats};
//!
//! let mut speed = MeanStats::new();
//! let mut speed_range = Extrema::new();
//! let mut roll = CircularMean::radians();
//!
//! for (v, phi) in [(1.2, 0.01), (1.4, -0.02), (1.3, 0.03)] {
//!     speed.update(v);
//!     speed_range.update(v);
//!     roll.update(phi);
//! }
//!
//! println!("Speed: {:.2} ± {:.2}", speed.mean(), speed.std_dev());
//! println!("Max speed: {:?}", speed_range.max());
//! println!("Mean roll: {:.3} rad", roll.mean());
//! ```

mod circular;
mod extrema;
mod moments;
mod window;

pub use circular::{AngleUnit, CircularMean};
pub use extrema::Extrema;
pub use moments::MeanStats;
pub use window::SlidingWindow;
