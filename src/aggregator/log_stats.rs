//! Streaming statistics of one log, or of a whole batch of logs
//!
//! [`LogStatistics`] consumes the events of a log in order and keeps running
//! extrema, linear and circular means, gap-aware travelled distance and
//! duration, and per-entity scalar variables. Once [`finalize`] is called the
//! derived figures (duration breakdown, amplitudes, average speeds) are
//! computed and the instance becomes read-only.
//!
//! [`finalize`]: LogStatistics::finalize

use std::collections::BTreeMap;

use chrono::DateTime;

use super::config::StatsConfig;
use super::entity::EntityMap;
use super::event::{EntityId, EventHeader, Payload, SensorEvent, SourceId, StateFix};
use super::variables::{Category, VariableEntry, VariableTable};
use crate::geodesy::{self, GeoPoint};
use crate::statistics::{CircularMean, Extrema, MeanStats, SlidingWindow};
use crate::traits::{ConfigError, MergeError};

/// Lifecycle of an aggregator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No navigation fix seen yet
    Empty,
    /// A track anchor was just (re)established, no distance yet
    Warm,
    /// Distance is being accumulated between consecutive fixes
    Streaming,
    /// Derived figures computed; no further updates are applied
    Finalized,
}

/// Travelled duration split into calendar-ish parts
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DurationParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl DurationParts {
    /// Split a number of seconds by floor-dividing days, hours and minutes off
    pub fn from_seconds(total: f64) -> Self {
        let days = (total / 86_400.0).floor();
        let mut rem = total % 86_400.0;
        let hours = (rem / 3_600.0).floor();
        rem %= 3_600.0;
        let minutes = (rem / 60.0).floor();
        let seconds = rem % 60.0;

        Self {
            days: days as u64,
            hours: hours as u64,
            minutes: minutes as u64,
            seconds,
        }
    }
}

/// Extrema plus linear and circular means of an angle (radians)
#[derive(Clone, Debug, PartialEq)]
pub struct AngleStats {
    pub extrema: Extrema,
    pub linear: MeanStats,
    pub circular: CircularMean,
}

impl Default for AngleStats {
    fn default() -> Self {
        Self {
            extrema: Extrema::new(),
            linear: MeanStats::new(),
            circular: CircularMean::radians(),
        }
    }
}

impl AngleStats {
    pub fn update(&mut self, angle: f64) {
        self.extrema.update(angle);
        self.linear.update(angle);
        self.circular.update(angle);
    }

    pub fn merge_with(&mut self, other: &AngleStats) -> Result<(), MergeError> {
        self.circular.merge_with(&other.circular)?;
        self.extrema.merge_with(&other.extrema);
        self.linear.merge_with(&other.linear);
        Ok(())
    }

    /// `max - min`, NaN when nothing was recorded
    pub fn amplitude(&self) -> f64 {
        self.extrema.amplitude().unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> u64 {
        self.extrema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extrema.is_empty()
    }
}

/// Windows reset on every track break
#[derive(Clone, Debug)]
struct SmoothingWindows {
    lat: SlidingWindow,
    lon: SlidingWindow,
    speed: SlidingWindow,
    vspeed: SlidingWindow,
}

impl SmoothingWindows {
    fn new(window_size: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            lat: SlidingWindow::new(window_size)?,
            lon: SlidingWindow::new(window_size)?,
            speed: SlidingWindow::new(window_size)?,
            vspeed: SlidingWindow::new(window_size)?,
        })
    }

    fn clear(&mut self) {
        self.lat.clear();
        self.lon.clear();
        self.speed.clear();
        self.vspeed.clear();
    }

    /// Position at the centre of the lat/lon windows
    fn position(&self) -> (f64, f64) {
        (self.lat.mean(), self.lon.mean())
    }
}

/// Aggregated statistics of a log (or of every log of a batch)
///
/// # Example
///
/// ```
/// use logstats::aggregator::{LogStatistics, SensorEvent, StateFix, StatsConfig};
///
/// let mut stats = LogStatistics::new(StatsConfig::new(0x2001)).unwrap();
///
/// stats.update(&SensorEvent::state(0x2001, 0.0, StateFix::at(0.5, 0.1)));
/// stats.update(&SensorEvent::state(0x2001, 5.0, StateFix::at(0.5001, 0.1001)));
/// stats.finalize();
///
/// assert_eq!(stats.num_states(), 2);
/// assert_eq!(stats.duration_travelled_millis(), 5000.0);
/// assert!(stats.distance() > 10.0);
/// ```
#[derive(Clone, Debug)]
pub struct LogStatistics {
    config: StatsConfig,
    phase: Phase,

    log_names: Vec<String>,
    pending_log_name: Option<String>,
    log_days: Vec<String>,
    number_of_logs: u64,
    system_name: Option<String>,

    start_millis: f64,
    end_millis: f64,
    last_millis: f64,
    last_location: Option<GeoPoint>,
    windows: SmoothingWindows,

    latitude: AngleStats,
    longitude: AngleStats,
    height: VariableEntry,
    depth: VariableEntry,
    altitude: VariableEntry,
    roll: AngleStats,
    pitch: AngleStats,
    sideslip: AngleStats,
    speed: VariableEntry,
    speed_smoothed: VariableEntry,
    vertical_speed: VariableEntry,
    vertical_speed_smoothed: VariableEntry,

    num_states: u64,
    distance: f64,
    distance_smoothed: f64,
    duration_travelled_millis: f64,
    pending_duration_millis: Option<f64>,

    variables: BTreeMap<Category, VariableTable>,
    entities: EntityMap,

    // Filled by finalize()
    duration_seconds: f64,
    duration_parts: Option<DurationParts>,
    roll_amplitude: f64,
    pitch_amplitude: f64,
    sideslip_amplitude: f64,
    avg_speed_mps_calc: f64,
    avg_speed_smoothed_mps_calc: f64,
}

impl LogStatistics {
    /// Create an empty aggregator
    ///
    /// Fails when the configuration does not validate.
    pub fn new(config: StatsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let windows = SmoothingWindows::new(config.sliding_window_size)?;

        Ok(Self {
            config,
            phase: Phase::Empty,
            log_names: Vec::new(),
            pending_log_name: None,
            log_days: Vec::new(),
            number_of_logs: 0,
            system_name: None,
            start_millis: -1.0,
            end_millis: -1.0,
            last_millis: -1.0,
            last_location: None,
            windows,
            latitude: AngleStats::default(),
            longitude: AngleStats::default(),
            height: VariableEntry::new(),
            depth: VariableEntry::new(),
            altitude: VariableEntry::new(),
            roll: AngleStats::default(),
            pitch: AngleStats::default(),
            sideslip: AngleStats::default(),
            speed: VariableEntry::new(),
            speed_smoothed: VariableEntry::new(),
            vertical_speed: VariableEntry::new(),
            vertical_speed_smoothed: VariableEntry::new(),
            num_states: 0,
            distance: 0.0,
            distance_smoothed: 0.0,
            duration_travelled_millis: 0.0,
            pending_duration_millis: None,
            variables: Category::ALL
                .into_iter()
                .map(|category| (category, VariableTable::new()))
                .collect(),
            entities: EntityMap::new(),
            duration_seconds: f64::NAN,
            duration_parts: None,
            roll_amplitude: f64::NAN,
            pitch_amplitude: f64::NAN,
            sideslip_amplitude: f64::NAN,
            avg_speed_mps_calc: f64::NAN,
            avg_speed_smoothed_mps_calc: f64::NAN,
        })
    }

    /// Start a new log: count it and remember its name
    ///
    /// The name is recorded as `"{YYYYMMDD}/{name}"` with the UTC day of the
    /// first navigation fix that follows. An empty name is recorded as `?`.
    pub fn new_log_name(&mut self, name: &str) {
        let name = name.trim();
        self.pending_log_name = Some(if name.is_empty() { "?".to_string() } else { name.to_string() });
        self.number_of_logs += 1;
    }

    /// Preset the system name, e.g. one learned by a previous log
    pub fn set_system_name(&mut self, name: Option<String>) {
        self.system_name = name.filter(|n| !n.is_empty());
    }

    // ------------------------------------------------------------------
    // Entity directory
    // ------------------------------------------------------------------

    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityMap {
        &mut self.entities
    }

    pub fn register_entity(&mut self, name: impl Into<String>, id: EntityId) {
        self.entities.insert(name, id);
    }

    /// Replace the entity directory
    pub fn set_entities(&mut self, entities: &EntityMap) {
        self.entities = entities.clone();
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    /// Apply one event, returning whether it was taken into account
    pub fn update(&mut self, event: &SensorEvent) -> bool {
        if self.phase == Phase::Finalized {
            log::debug!(
                "ignoring event from 0x{:04X} at {:.3}s: statistics already finalized",
                event.header.source,
                event.header.timestamp
            );
            return false;
        }

        let header = &event.header;
        match &event.payload {
            Payload::StateFix(fix) => self.update_state(header, fix),
            Payload::Voltage(value) => self.update_voltage(header, *value),
            Payload::Current(value) => self.update_current(header, *value),
            Payload::Temperature(value) => self.update_temperature(header, *value),
            Payload::DisplacementZ(value) => self.update_displacement_z(header, *value),
            Payload::NameAnnounce(name) => self.update_name(header, name),
        }
    }

    fn accepts(&self, header: &EventHeader) -> bool {
        self.phase != Phase::Finalized && header.source == self.config.source_id
    }

    /// Record the system name announced on the bus
    ///
    /// Only the first non-empty announcement of the configured system is kept.
    pub fn update_name(&mut self, header: &EventHeader, name: &str) -> bool {
        if !self.accepts(header) || self.system_name.is_some() || name.is_empty() {
            return false;
        }
        self.system_name = Some(name.to_string());
        true
    }

    /// Feed a navigation fix
    pub fn update_state(&mut self, header: &EventHeader, fix: &StateFix) -> bool {
        if !self.accepts(header) {
            return false;
        }
        let cur_millis = header.millis();

        // A jump back in time breaks the track as well
        let delta = cur_millis - self.last_millis;
        if self.last_location.is_some() && (delta > self.config.jump_time_millis as f64 || delta < 0.0) {
            log::debug!(
                "track break of {:.0} ms at {:.0} ms for 0x{:04X}",
                delta,
                cur_millis,
                self.config.source_id
            );
            self.windows.clear();
            self.flush_pending_duration();
            self.last_location = None;
        }

        self.update_sample_stats(fix);
        self.update_log_day(cur_millis);

        let position = GeoPoint::new(fix.lat, fix.lon, -fix.height).displaced(fix.x, fix.y, fix.z);
        self.latitude.update(position.lat);
        self.longitude.update(position.lon);

        match self.last_location {
            None => {
                if self.start_millis < 0.0 || cur_millis < self.start_millis {
                    self.start_millis = cur_millis;
                }
                self.flush_pending_duration();
                self.pending_duration_millis = Some(0.0);
                self.windows.lat.update(position.lat);
                self.windows.lon.update(position.lon);
                self.phase = Phase::Warm;
            }
            Some(last) => {
                self.distance += last.distance_to(&position);

                if self.config.smooth_filter {
                    let (last_lat, last_lon) = self.windows.position();
                    self.windows.lat.update(position.lat);
                    self.windows.lon.update(position.lon);
                    let (cur_lat, cur_lon) = self.windows.position();
                    self.distance_smoothed += geodesy::haversine(last_lat, last_lon, cur_lat, cur_lon);
                }

                *self.pending_duration_millis.get_or_insert(0.0) += cur_millis - self.last_millis;
                self.phase = Phase::Streaming;
            }
        }

        self.last_location = Some(position);
        self.last_millis = cur_millis;
        self.end_millis = self.end_millis.max(cur_millis);
        self.num_states += 1;
        true
    }

    fn update_sample_stats(&mut self, fix: &StateFix) {
        let smooth = self.config.smooth_filter;

        self.height.update(fix.height);
        if fix.depth > 0.0 {
            self.depth.update(fix.depth);
        }
        if fix.alt > 0.0 {
            self.altitude.update(fix.alt);
        }

        self.roll.update(fix.phi);
        self.pitch.update(fix.theta);

        // Both smoothed extrema follow the smoothed value; the smoothed
        // minimum is never taken from the raw speed
        let vspeed = fix.vz;
        self.vertical_speed.update(vspeed);
        let window_mean = self.windows.vspeed.update(vspeed);
        self.vertical_speed_smoothed.update(if smooth { window_mean } else { vspeed });

        let hspeed = fix.horizontal_speed();
        self.speed.update(hspeed);
        let window_mean = self.windows.speed.update(hspeed);
        self.speed_smoothed.update(if smooth { window_mean } else { hspeed });

        self.sideslip.update(geodesy::normalize_mpi_pi(fix.course() - fix.psi));
    }

    fn update_log_day(&mut self, cur_millis: f64) {
        let day = DateTime::from_timestamp_millis(cur_millis as i64)
            .map(|time| time.format("%Y%m%d").to_string());

        if let Some(day) = &day {
            if !self.log_days.contains(day) {
                self.log_days.push(day.clone());
            }
        }
        if let Some(name) = self.pending_log_name.take() {
            self.log_names.push(match day {
                Some(day) => format!("{}/{}", day, name),
                None => name,
            });
        }
    }

    fn flush_pending_duration(&mut self) {
        if let Some(pending) = self.pending_duration_millis.take() {
            self.duration_travelled_millis += pending;
        }
    }

    pub fn update_voltage(&mut self, header: &EventHeader, volts: f64) -> bool {
        self.update_variable(Category::Voltage, header, volts)
    }

    pub fn update_current(&mut self, header: &EventHeader, amps: f64) -> bool {
        self.update_variable(Category::Current, header, amps)
    }

    pub fn update_temperature(&mut self, header: &EventHeader, celsius: f64) -> bool {
        self.update_variable(Category::Temperature, header, celsius)
    }

    pub fn update_displacement_z(&mut self, header: &EventHeader, meters: f64) -> bool {
        self.update_variable(Category::DisplacementZ, header, meters)
    }

    /// Record a scalar sample of an entity
    ///
    /// A category with an inactive filter collects nothing. Otherwise any
    /// entity the directory names is recorded under that name; the filter
    /// only selects which pending entries reconciliation adopts. Samples of
    /// entities the directory doesn't name yet are kept aside under their
    /// raw id until [`map_unnamed_variables_to_named`] runs.
    ///
    /// [`map_unnamed_variables_to_named`]: LogStatistics::map_unnamed_variables_to_named
    pub fn update_variable(&mut self, category: Category, header: &EventHeader, value: f64) -> bool {
        if !self.accepts(header) {
            return false;
        }
        if !self.config.filter(category).is_active() {
            return false;
        }

        let table = self.variables.entry(category).or_default();
        match self.entities.name_of(header.entity) {
            Some(name) => table.update_named(name, value),
            None => table.update_pending(header.entity, value),
        }
        true
    }

    /// Move samples recorded under raw entity ids to their entity names
    ///
    /// Entries whose id the current directory can't name, or whose name the
    /// category filter doesn't select, are dropped. Running it twice is the
    /// same as running it once.
    pub fn map_unnamed_variables_to_named(&mut self) {
        for category in Category::ALL {
            let filter = self.config.filter(category);
            if let Some(table) = self.variables.get_mut(&category) {
                if table.has_pending() {
                    log::trace!(
                        "reconciling {} pending {} entities",
                        table.pending().len(),
                        category
                    );
                }
                table.reconcile(filter, &self.entities);
            }
        }
    }

    // ------------------------------------------------------------------
    // Finalize and merge
    // ------------------------------------------------------------------

    /// Compute the derived figures and freeze the statistics
    pub fn finalize(&mut self) {
        if self.phase == Phase::Finalized {
            return;
        }
        if !self.has_data() {
            log::warn!(
                "no navigation data found for source 0x{:04X}",
                self.config.source_id
            );
            self.phase = Phase::Finalized;
            return;
        }

        self.flush_pending_duration();

        self.duration_seconds = self.duration_travelled_millis / 1000.0;
        self.duration_parts = Some(DurationParts::from_seconds(self.duration_seconds));

        self.roll_amplitude = self.roll.amplitude();
        self.pitch_amplitude = self.pitch.amplitude();
        self.sideslip_amplitude = self.sideslip.amplitude();

        if self.duration_travelled_millis > 0.0 {
            self.avg_speed_mps_calc = self.distance / self.duration_seconds;
            self.avg_speed_smoothed_mps_calc = self.distance_smoothed / self.duration_seconds;
        } else {
            self.avg_speed_mps_calc = 0.0;
            self.avg_speed_smoothed_mps_calc = 0.0;
        }

        self.phase = Phase::Finalized;
    }

    /// Fold the cumulative statistics of another aggregator into this one
    ///
    /// Track continuity (smoothing windows, last location) and samples of
    /// unnamed entities stay with their own instance. Both aggregators must
    /// watch the same system with the same entity filters.
    pub fn merge(&mut self, other: &LogStatistics) -> Result<(), MergeError> {
        if self.phase == Phase::Finalized {
            return Err(MergeError::Finalized);
        }
        if self.config.source_id != other.config.source_id {
            return Err(MergeError::IncompatibleConfig {
                expected: format!("source 0x{:04X}", self.config.source_id),
                found: format!("source 0x{:04X}", other.config.source_id),
            });
        }
        let track = |config: &StatsConfig| {
            format!(
                "gap {} ms, smoothing {} (window {})",
                config.jump_time_millis,
                if config.smooth_filter { "on" } else { "off" },
                config.sliding_window_size
            )
        };
        let (ours, theirs) = (track(&self.config), track(&other.config));
        if ours != theirs {
            return Err(MergeError::IncompatibleConfig {
                expected: ours,
                found: theirs,
            });
        }
        for category in Category::ALL {
            let ours = self.config.filter(category);
            let theirs = other.config.filter(category);
            if ours != theirs {
                return Err(MergeError::IncompatibleConfig {
                    expected: format!("{} entities {:?}", category, ours),
                    found: format!("{} entities {:?}", category, theirs),
                });
            }
        }

        log::debug!(
            "merging {} states from {} log(s) into 0x{:04X}",
            other.num_states,
            other.number_of_logs,
            self.config.source_id
        );

        self.latitude.merge_with(&other.latitude)?;
        self.longitude.merge_with(&other.longitude)?;
        self.roll.merge_with(&other.roll)?;
        self.pitch.merge_with(&other.pitch)?;
        self.sideslip.merge_with(&other.sideslip)?;

        for (ours, theirs) in [
            (&mut self.height, &other.height),
            (&mut self.depth, &other.depth),
            (&mut self.altitude, &other.altitude),
            (&mut self.speed, &other.speed),
            (&mut self.speed_smoothed, &other.speed_smoothed),
            (&mut self.vertical_speed, &other.vertical_speed),
            (&mut self.vertical_speed_smoothed, &other.vertical_speed_smoothed),
        ] {
            ours.merge_with(theirs);
        }

        self.num_states += other.num_states;
        self.distance += other.distance;
        self.distance_smoothed += other.distance_smoothed;
        self.duration_travelled_millis +=
            other.duration_travelled_millis + other.pending_duration_millis.unwrap_or(0.0);
        self.number_of_logs += other.number_of_logs;

        for name in &other.log_names {
            if !self.log_names.contains(name) {
                self.log_names.push(name.clone());
            }
        }
        for day in &other.log_days {
            if !self.log_days.contains(day) {
                self.log_days.push(day.clone());
            }
        }
        if self.system_name.is_none() {
            self.system_name = other.system_name.clone();
        }

        if other.has_data() {
            if self.start_millis < 0.0 || other.start_millis < self.start_millis {
                self.start_millis = other.start_millis;
            }
            if other.end_millis > self.end_millis {
                self.end_millis = other.end_millis;
            }
            if self.phase == Phase::Empty {
                self.phase = Phase::Warm;
            }
        }

        for (category, table) in &other.variables {
            self.variables.entry(*category).or_default().merge_named(table);
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Read-back
    // ------------------------------------------------------------------

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn source_id(&self) -> SourceId {
        self.config.source_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// Whether at least one navigation fix was recorded
    pub fn has_data(&self) -> bool {
        self.start_millis >= 0.0
    }

    pub fn system_name(&self) -> Option<&str> {
        self.system_name.as_deref()
    }

    /// Log names as `"{YYYYMMDD}/{name}"`
    pub fn log_names(&self) -> &[String] {
        &self.log_names
    }

    /// UTC days (`YYYYMMDD`) with navigation data, in order of appearance
    pub fn log_days(&self) -> &[String] {
        &self.log_days
    }

    pub fn number_of_logs(&self) -> u64 {
        self.number_of_logs
    }

    /// First fix time (ms), negative without data
    pub fn start_millis(&self) -> f64 {
        self.start_millis
    }

    /// Last fix time (ms), negative without data
    pub fn end_millis(&self) -> f64 {
        self.end_millis
    }

    pub fn num_states(&self) -> u64 {
        self.num_states
    }

    /// Travelled distance (m)
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Travelled distance between smoothed positions (m)
    pub fn distance_smoothed(&self) -> f64 {
        self.distance_smoothed
    }

    /// Time spent moving between fixes, excluding track breaks (ms)
    pub fn duration_travelled_millis(&self) -> f64 {
        self.duration_travelled_millis + self.pending_duration_millis.unwrap_or(0.0)
    }

    /// Travelled duration (s), NaN before finalize
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn duration_parts(&self) -> Option<DurationParts> {
        self.duration_parts
    }

    pub fn latitude(&self) -> &AngleStats {
        &self.latitude
    }

    pub fn longitude(&self) -> &AngleStats {
        &self.longitude
    }

    pub fn height(&self) -> &VariableEntry {
        &self.height
    }

    /// Depth statistics, positive samples only
    pub fn depth(&self) -> &VariableEntry {
        &self.depth
    }

    /// Altitude statistics, positive samples only
    pub fn altitude(&self) -> &VariableEntry {
        &self.altitude
    }

    pub fn roll(&self) -> &AngleStats {
        &self.roll
    }

    pub fn pitch(&self) -> &AngleStats {
        &self.pitch
    }

    pub fn sideslip(&self) -> &AngleStats {
        &self.sideslip
    }

    /// Horizontal speed (m/s)
    pub fn speed(&self) -> &VariableEntry {
        &self.speed
    }

    pub fn speed_smoothed(&self) -> &VariableEntry {
        &self.speed_smoothed
    }

    pub fn vertical_speed(&self) -> &VariableEntry {
        &self.vertical_speed
    }

    pub fn vertical_speed_smoothed(&self) -> &VariableEntry {
        &self.vertical_speed_smoothed
    }

    pub fn roll_amplitude(&self) -> f64 {
        self.roll_amplitude
    }

    pub fn pitch_amplitude(&self) -> f64 {
        self.pitch_amplitude
    }

    pub fn sideslip_amplitude(&self) -> f64 {
        self.sideslip_amplitude
    }

    /// Distance over travelled time (m/s), NaN before finalize
    pub fn avg_speed_mps_calc(&self) -> f64 {
        self.avg_speed_mps_calc
    }

    pub fn avg_speed_smoothed_mps_calc(&self) -> f64 {
        self.avg_speed_smoothed_mps_calc
    }

    pub fn variables(&self, category: Category) -> Option<&VariableTable> {
        self.variables.get(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::EntityFilter;
    use approx::assert_relative_eq;

    const SRC: SourceId = 0x2001;

    fn stats(config: StatsConfig) -> LogStatistics {
        LogStatistics::new(config).unwrap()
    }

    fn fix(lat: f64, lon: f64) -> StateFix {
        StateFix::at(lat, lon)
    }

    fn moving(lat: f64, lon: f64, speed: f64) -> StateFix {
        StateFix {
            vx: speed,
            ..StateFix::at(lat, lon)
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            LogStatistics::new(StatsConfig::new(0)),
            Err(ConfigError::SourceIdOutOfRange(0))
        ));
        assert!(matches!(
            LogStatistics::new(StatsConfig::new(SRC).with_smoothing(0)),
            Err(ConfigError::ZeroWindowSize)
        ));
    }

    #[test]
    fn test_end_to_end_two_fixes() {
        let mut s = stats(StatsConfig::new(SRC));
        assert_eq!(s.phase(), Phase::Empty);

        assert!(s.update(&SensorEvent::state(SRC, 0.0, fix(0.5, 0.1))));
        assert_eq!(s.phase(), Phase::Warm);
        assert!(s.update(&SensorEvent::state(SRC, 5.0, fix(0.5001, 0.1001))));
        assert_eq!(s.phase(), Phase::Streaming);
        s.finalize();

        let expected = geodesy::haversine(0.5, 0.1, 0.5001, 0.1001);
        assert_eq!(s.num_states(), 2);
        assert_relative_eq!(s.distance(), expected, max_relative = 1e-9);
        assert_eq!(s.duration_travelled_millis(), 5000.0);
        assert_relative_eq!(s.avg_speed_mps_calc(), expected / 5.0, max_relative = 1e-9);
        assert_eq!(s.start_millis(), 0.0);
        assert_eq!(s.end_millis(), 5000.0);
        assert_eq!(s.phase(), Phase::Finalized);
    }

    #[test]
    fn test_gap_breaks_track() {
        let mut s = stats(StatsConfig::new(SRC).with_smoothing(10));

        s.update(&SensorEvent::state(SRC, 0.0, moving(0.5, 0.1, 1.0)));
        s.update(&SensorEvent::state(SRC, 1.0, moving(0.5001, 0.1, 1.0)));
        s.update(&SensorEvent::state(SRC, 20.0, moving(0.6, 0.1, 5.0)));
        assert_eq!(s.phase(), Phase::Warm);
        s.update(&SensorEvent::state(SRC, 21.0, moving(0.6001, 0.1, 5.0)));
        s.finalize();

        let expected = geodesy::haversine(0.5, 0.1, 0.5001, 0.1)
            + geodesy::haversine(0.6, 0.1, 0.6001, 0.1);
        assert_relative_eq!(s.distance(), expected, max_relative = 1e-9);
        assert_eq!(s.duration_travelled_millis(), 2000.0);
        assert_eq!(s.num_states(), 4);

        // Windows restart at the gap, so the first smoothed speed after it
        // is the raw one
        assert_eq!(s.speed_smoothed().extrema.max(), Some(5.0));
        assert_eq!(s.speed_smoothed().extrema.min(), Some(1.0));
    }

    #[test]
    fn test_smoothed_speed_extrema_follow_window_mean() {
        let mut s = stats(StatsConfig::new(SRC).with_smoothing(10));
        let f = |speed: f64| StateFix {
            vz: speed,
            ..moving(0.5, 0.1, speed)
        };
        s.update(&SensorEvent::state(SRC, 0.0, f(4.0)));
        s.update(&SensorEvent::state(SRC, 1.0, f(1.0)));

        assert_eq!(s.speed().extrema.min(), Some(1.0));
        assert_eq!(s.speed_smoothed().extrema.min(), Some(2.5));
        assert_eq!(s.speed_smoothed().extrema.max(), Some(4.0));
        assert_relative_eq!(s.speed_smoothed().avg.mean(), 3.25);
        assert_eq!(s.vertical_speed_smoothed().extrema.min(), Some(2.5));
        assert_eq!(s.vertical_speed_smoothed().extrema.max(), Some(4.0));
    }

    #[test]
    fn test_smoothed_speed_is_raw_without_smoothing() {
        let mut s = stats(StatsConfig::new(SRC));
        s.update(&SensorEvent::state(SRC, 0.0, moving(0.5, 0.1, 4.0)));
        s.update(&SensorEvent::state(SRC, 1.0, moving(0.5, 0.1, 1.0)));
        assert_eq!(s.speed_smoothed().extrema.min(), Some(1.0));
        assert_eq!(s.vertical_speed_smoothed().extrema.max(), Some(0.0));
    }

    #[test]
    fn test_time_going_backwards_breaks_track() {
        let mut s = stats(StatsConfig::new(SRC));
        s.update(&SensorEvent::state(SRC, 100.0, fix(0.5, 0.1)));
        s.update(&SensorEvent::state(SRC, 101.0, fix(0.5001, 0.1)));
        s.update(&SensorEvent::state(SRC, 50.0, fix(0.6, 0.1)));
        assert_eq!(s.phase(), Phase::Warm);
        s.update(&SensorEvent::state(SRC, 51.0, fix(0.6001, 0.1)));
        s.finalize();

        let expected = geodesy::haversine(0.5, 0.1, 0.5001, 0.1)
            + geodesy::haversine(0.6, 0.1, 0.6001, 0.1);
        assert_relative_eq!(s.distance(), expected, max_relative = 1e-9);
        assert_eq!(s.duration_travelled_millis(), 2000.0);
        assert_eq!(s.start_millis(), 50_000.0);
        assert_eq!(s.end_millis(), 101_000.0);
    }

    #[test]
    fn test_duration_parts() {
        let parts = DurationParts::from_seconds(90_061.5);
        assert_eq!(parts.days, 1);
        assert_eq!(parts.hours, 1);
        assert_eq!(parts.minutes, 1);
        assert!((parts.seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_finalize() {
        let mut s = stats(StatsConfig::new(SRC));
        s.finalize();
        assert!(!s.has_data());
        assert!(s.start_millis() < 0.0);
        assert!(s.end_millis() < 0.0);
        assert!(s.is_finalized());
        assert_eq!(s.duration_parts(), None);
    }

    #[test]
    fn test_single_fix_has_zero_speed() {
        let mut s = stats(StatsConfig::new(SRC));
        s.update(&SensorEvent::state(SRC, 10.0, fix(0.5, 0.1)));
        s.finalize();
        assert!(s.has_data());
        assert_eq!(s.distance(), 0.0);
        assert_eq!(s.avg_speed_mps_calc(), 0.0);
        assert_eq!(s.avg_speed_smoothed_mps_calc(), 0.0);
    }

    #[test]
    fn test_events_after_finalize_ignored() {
        let mut s = stats(StatsConfig::new(SRC));
        s.update(&SensorEvent::state(SRC, 0.0, fix(0.5, 0.1)));
        s.finalize();
        assert!(!s.update(&SensorEvent::state(SRC, 1.0, fix(0.5001, 0.1))));
        assert_eq!(s.num_states(), 1);
    }

    #[test]
    fn test_source_mismatch_ignored() {
        let mut s = stats(StatsConfig::new(SRC).with_voltage_entities(EntityFilter::All));
        assert!(!s.update(&SensorEvent::state(0x3000, 0.0, fix(0.5, 0.1))));
        assert!(!s.update(&SensorEvent::voltage(0x3000, 1, 0.0, 24.0)));
        assert!(!s.update(&SensorEvent::announce(0x3000, 0.0, "other")));
        assert!(!s.has_data());
        assert_eq!(s.system_name(), None);
    }

    #[test]
    fn test_name_accepted_once() {
        let mut s = stats(StatsConfig::new(SRC));
        assert!(!s.update(&SensorEvent::announce(SRC, 0.0, "")));
        assert!(s.update(&SensorEvent::announce(SRC, 0.0, "lauv-xplore-1")));
        assert!(!s.update(&SensorEvent::announce(SRC, 1.0, "renamed")));
        assert_eq!(s.system_name(), Some("lauv-xplore-1"));
    }

    #[test]
    fn test_depth_and_altitude_only_when_positive() {
        let mut s = stats(StatsConfig::new(SRC));
        for (t, depth, alt) in [(0.0, 0.0, -1.0), (1.0, 2.0, 5.0), (2.0, 4.0, 0.0)] {
            let f = StateFix {
                depth,
                alt,
                ..fix(0.5, 0.1)
            };
            s.update(&SensorEvent::state(SRC, t, f));
        }
        assert_eq!(s.depth().len(), 2);
        assert_relative_eq!(s.depth().avg.mean(), 3.0);
        assert_eq!(s.altitude().len(), 1);
        assert_eq!(s.height().len(), 3);
    }

    #[test]
    fn test_sideslip_and_amplitudes() {
        let mut s = stats(StatsConfig::new(SRC));
        let f = StateFix {
            vx: 1.0,
            vy: 1.0,
            psi: 0.0,
            phi: -0.1,
            theta: 0.05,
            ..fix(0.5, 0.1)
        };
        s.update(&SensorEvent::state(SRC, 0.0, f));
        let f = StateFix { phi: 0.2, theta: 0.1, ..f };
        s.update(&SensorEvent::state(SRC, 1.0, f));
        s.finalize();

        assert_relative_eq!(s.sideslip().extrema.max().unwrap(), core::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(s.sideslip_amplitude(), 0.0);
        assert_relative_eq!(s.roll_amplitude(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(s.pitch_amplitude(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_log_names_get_day_prefix() {
        let mut s = stats(StatsConfig::new(SRC));
        s.new_log_name("20240607/095512_survey");
        s.update(&SensorEvent::state(SRC, 1_717_754_112.0, fix(0.5, 0.1)));
        assert_eq!(s.number_of_logs(), 1);
        assert_eq!(s.log_days(), ["20240607".to_string()]);
        assert_eq!(s.log_names(), ["20240607/20240607/095512_survey".to_string()]);

        s.new_log_name("  ");
        s.update(&SensorEvent::state(SRC, 1_717_754_112.0 + 86_400.0, fix(0.5, 0.1)));
        assert_eq!(s.log_names()[1], "20240608/?");
        assert_eq!(s.log_days().len(), 2);
    }

    #[test]
    fn test_variables_resolve_late() {
        let config = StatsConfig::new(SRC).with_voltage_entities(EntityFilter::from_names(["Batteries"]));
        let mut s = stats(config);

        s.update(&SensorEvent::voltage(SRC, 12, 0.0, 24.0));
        s.update(&SensorEvent::voltage(SRC, 12, 1.0, 23.0));
        assert!(s.variables(Category::Voltage).unwrap().named().is_empty());

        s.register_entity("Batteries", 12);
        assert!(s.update(&SensorEvent::voltage(SRC, 12, 2.0, 22.0)));

        s.map_unnamed_variables_to_named();
        let table = s.variables(Category::Voltage).unwrap();
        let batteries = table.get("Batteries").unwrap().summary();
        assert_eq!(batteries.count, 3);
        assert_eq!(batteries.min, 22.0);
        assert_eq!(batteries.max, 24.0);
    }

    #[test]
    fn test_named_entity_recorded_outside_filter() {
        let config = StatsConfig::new(SRC).with_voltage_entities(EntityFilter::from_names(["Batteries"]));
        let mut s = stats(config);

        // Pending samples of an unselected entity are not adopted
        s.update(&SensorEvent::voltage(SRC, 3, 0.0, 3.2));
        s.register_entity("CPU", 3);
        s.map_unnamed_variables_to_named();
        assert!(s.variables(Category::Voltage).unwrap().get("CPU").is_none());

        // Once named, its samples go to the named table
        assert!(s.update(&SensorEvent::voltage(SRC, 3, 1.0, 3.3)));
        let cpu = s.variables(Category::Voltage).unwrap().get("CPU").unwrap().summary();
        assert_eq!(cpu.count, 1);
        assert_eq!(cpu.max, 3.3);
    }

    #[test]
    fn test_inactive_filter_collects_nothing() {
        let mut s = stats(StatsConfig::new(SRC));
        assert!(!s.update(&SensorEvent::temperature(SRC, 1, 0.0, 20.0)));
        assert!(!s.variables(Category::Temperature).unwrap().has_pending());
    }

    #[test]
    fn test_merge_halves() {
        let config = StatsConfig::new(SRC);
        let fixes = [
            (0.0, moving(0.5, 0.1, 1.0)),
            (1.0, moving(0.5001, 0.1, 1.5)),
            (2.0, moving(0.5002, 0.1, 2.0)),
            (3.0, moving(0.5003, 0.1, 2.5)),
        ];

        let mut first = stats(config.clone());
        let mut second = stats(config);
        for (t, f) in &fixes[..2] {
            first.update(&SensorEvent::state(SRC, *t, *f));
        }
        for (t, f) in &fixes[2..] {
            second.update(&SensorEvent::state(SRC, *t, *f));
        }

        first.merge(&second).unwrap();
        assert_eq!(first.num_states(), 4);
        assert_eq!(first.duration_travelled_millis(), 2000.0);
        assert_eq!(first.start_millis(), 0.0);
        assert_eq!(first.end_millis(), 3000.0);
        assert_relative_eq!(first.speed().avg.mean(), 1.75, epsilon = 1e-12);
        assert_eq!(first.speed().extrema.max(), Some(2.5));
    }

    #[test]
    fn test_merge_rejects_mismatch() {
        let mut a = stats(StatsConfig::new(SRC));
        let b = stats(StatsConfig::new(0x2002));
        assert!(matches!(a.merge(&b), Err(MergeError::IncompatibleConfig { .. })));

        let c = stats(StatsConfig::new(SRC).with_voltage_entities(EntityFilter::All));
        assert!(matches!(a.merge(&c), Err(MergeError::IncompatibleConfig { .. })));

        let smoothed = stats(StatsConfig::new(SRC).with_smoothing(10));
        assert!(matches!(a.merge(&smoothed), Err(MergeError::IncompatibleConfig { .. })));

        let wider = stats(StatsConfig::new(SRC).with_smoothing(20));
        let mut narrow = stats(StatsConfig::new(SRC).with_smoothing(10));
        assert!(matches!(narrow.merge(&wider), Err(MergeError::IncompatibleConfig { .. })));

        let patient = stats(StatsConfig::new(SRC).with_jump_time_millis(60_000));
        assert!(matches!(a.merge(&patient), Err(MergeError::IncompatibleConfig { .. })));

        a.finalize();
        let d = stats(StatsConfig::new(SRC));
        assert_eq!(a.merge(&d), Err(MergeError::Finalized));
    }

    #[test]
    fn test_smoothed_distance_shorter_than_raw_on_zigzag() {
        let mut s = stats(StatsConfig::new(SRC).with_smoothing(4));
        for i in 0..20 {
            let lon = if i % 2 == 0 { 0.1 } else { 0.1001 };
            s.update(&SensorEvent::state(SRC, i as f64, fix(0.5 + i as f64 * 1e-5, lon)));
        }
        s.finalize();
        assert!(s.distance_smoothed() > 0.0);
        assert!(s.distance_smoothed() < s.distance());
    }
}
