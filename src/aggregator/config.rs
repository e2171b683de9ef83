//! Aggregator configuration

use super::entity::EntityFilter;
use super::event::SourceId;
use super::variables::Category;
use crate::traits::ConfigError;

/// Default gap length that breaks a track (ms)
pub const DEFAULT_JUMP_TIME_MILLIS: u64 = 10_000;
/// Default smoothing window length (samples)
pub const DEFAULT_SLIDING_WINDOW_SIZE: usize = 10;

/// Settings shared by the per-log and the global aggregators of a batch
///
/// # Example
///
/// ```
/// use logstats::aggregator::{EntityFilter, StatsConfig};
///
/// let config = StatsConfig::new(0x2001)
///     .with_jump_time_millis(5_000)
///     .with_smoothing(20)
///     .with_voltage_entities(EntityFilter::from_names(["Batteries"]));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatsConfig {
    /// Only events from this system are aggregated
    pub source_id: SourceId,
    /// Time between two fixes above which the track is considered broken (ms)
    pub jump_time_millis: u64,
    /// Also report sliding-window smoothed speeds and distance
    pub smooth_filter: bool,
    /// Length of the smoothing windows (samples)
    pub sliding_window_size: usize,
    pub voltage_entities: EntityFilter,
    pub current_entities: EntityFilter,
    pub temperature_entities: EntityFilter,
    pub displacement_z_entities: EntityFilter,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            source_id: 0,
            jump_time_millis: DEFAULT_JUMP_TIME_MILLIS,
            smooth_filter: false,
            sliding_window_size: DEFAULT_SLIDING_WINDOW_SIZE,
            voltage_entities: EntityFilter::Nothing,
            current_entities: EntityFilter::Nothing,
            temperature_entities: EntityFilter::Nothing,
            displacement_z_entities: EntityFilter::Nothing,
        }
    }
}

impl StatsConfig {
    /// Default settings for the given system
    pub fn new(source_id: SourceId) -> Self {
        Self {
            source_id,
            ..Self::default()
        }
    }

    pub fn with_jump_time_millis(mut self, millis: u64) -> Self {
        self.jump_time_millis = millis;
        self
    }

    /// Enable smoothing with the given window length
    pub fn with_smoothing(mut self, window_size: usize) -> Self {
        self.smooth_filter = true;
        self.sliding_window_size = window_size;
        self
    }

    pub fn with_voltage_entities(mut self, filter: EntityFilter) -> Self {
        self.voltage_entities = filter;
        self
    }

    pub fn with_current_entities(mut self, filter: EntityFilter) -> Self {
        self.current_entities = filter;
        self
    }

    pub fn with_temperature_entities(mut self, filter: EntityFilter) -> Self {
        self.temperature_entities = filter;
        self
    }

    pub fn with_displacement_z_entities(mut self, filter: EntityFilter) -> Self {
        self.displacement_z_entities = filter;
        self
    }

    /// Collect voltage and current of the `Batteries` entity
    pub fn with_batteries(mut self) -> Self {
        for filter in [&mut self.voltage_entities, &mut self.current_entities] {
            *filter = match std::mem::take(filter) {
                EntityFilter::All => EntityFilter::All,
                EntityFilter::Nothing => EntityFilter::from_names(["Batteries"]),
                EntityFilter::Named(mut names) => {
                    names.insert("Batteries".to_string());
                    EntityFilter::Named(names)
                }
            };
        }
        self
    }

    /// The filter for a variable category
    pub fn filter(&self, category: Category) -> &EntityFilter {
        match category {
            Category::Voltage => &self.voltage_entities,
            Category::Current => &self.current_entities,
            Category::Temperature => &self.temperature_entities,
            Category::DisplacementZ => &self.displacement_z_entities,
        }
    }

    /// Check the settings, failing fast on values no aggregator can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_id == 0x0000 || self.source_id == 0xFFFF {
            return Err(ConfigError::SourceIdOutOfRange(u32::from(self.source_id)));
        }
        if self.sliding_window_size == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        Ok(())
    }
}
