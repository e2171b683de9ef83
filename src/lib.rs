//! # Logstats
//!
//! Streaming statistics for vehicle telemetry logs.
//!
//! Logstats turns an ordered stream of navigation fixes and sensor readings
//! into per-log and batch-wide summaries: extrema, linear and circular means,
//! standard deviations, smoothed speeds, and gap-aware travelled distance and
//! duration.
//!
//! ## Features
//!
//! - **Numerically stable accumulators**: Welford moments, circular means, sliding windows
//! - **Geodesy**: haversine distance, bearings, WGS-84 ECEF conversions
//! - **Gap-aware tracks**: distance and duration are not accumulated across recording gaps
//! - **Late entity resolution**: readings recorded before their entity is named are kept and folded in later
//! - **Full Mergeability**: statistics of independent logs combine into a batch aggregate
//!
//! ## Quick Start
//!
//! ```rust
//! use logstats::prelude::*;
//!
//! let config = StatsConfig::new(0x2001).with_voltage_entities(EntityFilter::from_names(["Batteries"]));
//! let mut stats = LogStatistics::new(config).unwrap();
//!
//! stats.register_entity("Batteries", 12);
//! stats.update(&SensorEvent::state(0x2001, 0.0, StateFix::at(0.7188, -0.1519)));
//! stats.update(&SensorEvent::voltage(0x2001, 12, 0.5, 24.3));
//! stats.update(&SensorEvent::state(0x2001, 1.0, StateFix::at(0.71881, -0.1519)));
//! stats.finalize();
//!
//! println!("{}", stats);
//! ```
//!
//! ## Batches
//!
//! A [`Batch`](aggregator::Batch) runs one aggregator per log alongside a
//! global one. Independent logs can also be processed in parallel and folded
//! together with [`LogStatistics::merge`](aggregator::LogStatistics::merge):
//!
//! ```rust
//! use logstats::aggregator::{LogStatistics, SensorEvent, StateFix, StatsConfig};
//!
//! let config = StatsConfig::new(0x2001);
//! let mut worker1 = LogStatistics::new(config.clone()).unwrap();
//! let mut worker2 = LogStatistics::new(config).unwrap();
//!
//! worker1.update(&SensorEvent::state(0x2001, 0.0, StateFix::at(0.5, 0.1)));
//! worker2.update(&SensorEvent::state(0x2001, 3600.0, StateFix::at(0.6, 0.1)));
//!
//! worker1.merge(&worker2).unwrap();
//! worker1.finalize();
//! assert_eq!(worker1.num_states(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! Algorithm families (pick what you need):
//! - `statistics` (default): running moments, circular means, sliding windows, extrema
//! - `geodesy` (default): great-circle and ellipsoid helpers
//! - `aggregator` (default): log statistics, reports and the batch driver (requires `std`)
//! - `full`: Enable all algorithm families
//!
//! Platform features:
//! - `std` (default): Standard library support
//! - `serde`: Enable serialization

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Core traits always available
pub mod traits;

pub mod units;

#[cfg(feature = "statistics")]
#[cfg_attr(docsrs, doc(cfg(feature = "statistics")))]
pub mod statistics;

#[cfg(feature = "geodesy")]
#[cfg_attr(docsrs, doc(cfg(feature = "geodesy")))]
pub mod geodesy;

#[cfg(feature = "aggregator")]
#[cfg_attr(docsrs, doc(cfg(feature = "aggregator")))]
pub mod aggregator;

// Internal modules
mod math;

pub mod prelude {
    pub use crate::traits::*;

    #[cfg(feature = "statistics")]
    pub use crate::statistics::{AngleUnit, CircularMean, Extrema, MeanStats, SlidingWindow};

    #[cfg(feature = "geodesy")]
    pub use crate::geodesy::{haversine, normalize_0_2pi, normalize_mpi_pi, GeoPoint};

    #[cfg(feature = "aggregator")]
    pub use crate::aggregator::{
        Batch, Category, EntityFilter, EntityMap, LogStatistics, SensorEvent, StateFix,
        StatsConfig,
    };
}

#[cfg(feature = "statistics")]
pub use statistics::MeanStats;

#[cfg(feature = "aggregator")]
pub use aggregator::LogStatistics;
