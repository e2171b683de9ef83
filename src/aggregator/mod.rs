//! Telemetry log statistics
//!
//! Feed [`SensorEvent`]s of one system into a [`LogStatistics`] (or let a
//! [`Batch`] run one per log plus a batch-wide one), then read the finalized
//! figures back through the accessors, the `Display` report, [`rows`] or
//! [`variable_table`].
//!
//! [`rows`]: LogStatistics::rows
//! [`variable_table`]: LogStatistics::variable_table

mod batch;
mod config;
mod entity;
mod event;
mod log_stats;
mod report;
mod variables;

pub use batch::Batch;
pub use config::{StatsConfig, DEFAULT_JUMP_TIME_MILLIS, DEFAULT_SLIDING_WINDOW_SIZE};
pub use entity::{EntityFilter, EntityMap};
pub use event::{EntityId, EventHeader, Payload, SensorEvent, SourceId, StateFix};
pub use log_stats::{AngleStats, DurationParts, LogStatistics, Phase};
pub use report::{ReportRow, ReportValue, LABEL_WIDTH};
pub use variables::{reconcile, Category, VariableEntry, VariableSummary, VariableTable};
