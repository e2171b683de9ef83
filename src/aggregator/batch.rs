//! Driver feeding a sequence of logs to per-log and batch-wide statistics

use super::config::StatsConfig;
use super::entity::EntityMap;
use super::event::{EntityId, SensorEvent};
use super::log_stats::LogStatistics;
use crate::traits::ConfigError;

/// Runs one [`LogStatistics`] per log next to a global one for the batch
///
/// Every event goes to both instances. The entity directory is per log: it
/// is cleared on the global instance whenever a log starts or ends, after
/// samples recorded under raw ids have been reconciled.
///
/// Logs must be fed in time order. A log that starts before the previous one
/// ended breaks the global track instead of bridging the two.
///
/// # Example
///
/// ```
/// use logstats::aggregator::{Batch, SensorEvent, StateFix, StatsConfig};
///
/// let mut batch = Batch::new(StatsConfig::new(0x2001)).unwrap();
///
/// batch.begin_log("survey-a");
/// batch.dispatch(&SensorEvent::state(0x2001, 0.0, StateFix::at(0.5, 0.1)));
/// batch.dispatch(&SensorEvent::state(0x2001, 1.0, StateFix::at(0.5001, 0.1)));
/// let per_log = batch.end_log().unwrap();
///
/// let global = batch.finish();
/// assert_eq!(per_log.num_states(), 2);
/// assert_eq!(global.number_of_logs(), 1);
/// ```
#[derive(Debug)]
pub struct Batch {
    template: LogStatistics,
    global: LogStatistics,
    current: Option<LogStatistics>,
}

impl Batch {
    pub fn new(config: StatsConfig) -> Result<Self, ConfigError> {
        let template = LogStatistics::new(config)?;
        Ok(Self {
            global: template.clone(),
            template,
            current: None,
        })
    }

    /// Start a log, discarding any log that was not ended
    ///
    /// Samples the global statistics still hold under raw entity ids are
    /// resolved against the previous directory first, then dropped, so they
    /// are never credited to an entity of the new log that reuses the id.
    pub fn begin_log(&mut self, name: &str) {
        if let Some(open) = self.current.take() {
            log::warn!(
                "log {:?} was never ended, discarding its statistics",
                open.log_names().last()
            );
        }

        self.close_global_log();

        let mut log_stats = self.template.clone();
        log_stats.set_system_name(self.global.system_name().map(str::to_owned));
        log_stats.new_log_name(name);
        self.global.new_log_name(name);

        self.current = Some(log_stats);
    }

    pub fn register_entity(&mut self, name: &str, id: EntityId) {
        self.global.register_entity(name, id);
        if let Some(current) = self.current.as_mut() {
            current.register_entity(name, id);
        }
    }

    /// Apply the directory of the current log
    pub fn set_entities(&mut self, entities: &EntityMap) {
        self.global.set_entities(entities);
        if let Some(current) = self.current.as_mut() {
            current.set_entities(entities);
        }
    }

    /// Feed an event to the global and the current log's statistics
    ///
    /// Returns whether either of them took it into account.
    pub fn dispatch(&mut self, event: &SensorEvent) -> bool {
        let global = self.global.update(event);
        let current = self
            .current
            .as_mut()
            .map(|current| current.update(event))
            .unwrap_or(false);
        global || current
    }

    /// Close the current log and hand back its finalized statistics
    pub fn end_log(&mut self) -> Option<LogStatistics> {
        let mut log_stats = self.current.take()?;
        log_stats.finalize();
        log_stats.map_unnamed_variables_to_named();
        self.close_global_log();
        Some(log_stats)
    }

    /// Drop the current log after an ingestion failure
    ///
    /// Whatever the global statistics already received from it is kept.
    pub fn skip_log(&mut self, reason: &str) {
        let name = self
            .current
            .take()
            .and_then(|log_stats| log_stats.log_names().last().cloned());
        log::warn!("skipping log {}: {}", name.as_deref().unwrap_or("?"), reason);
        self.close_global_log();
    }

    fn close_global_log(&mut self) {
        self.global.map_unnamed_variables_to_named();
        self.global.entities_mut().clear();
    }

    pub fn global(&self) -> &LogStatistics {
        &self.global
    }

    pub fn current(&self) -> Option<&LogStatistics> {
        self.current.as_ref()
    }

    /// Finalize and return the batch-wide statistics
    pub fn finish(mut self) -> LogStatistics {
        if self.current.is_some() {
            self.end_log();
        }
        self.global.map_unnamed_variables_to_named();
        self.global.finalize();
        self.global
    }
}
