//! Read-back projections of [`LogStatistics`]
//!
//! Three views of the same state: a human-readable report (`Display`), a
//! flat list of named rows for spreadsheet-like writers, and the per-entity
//! variable tables. None of them computes anything new.

use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;

use super::log_stats::{AngleStats, LogStatistics};
use super::variables::{Category, VariableEntry, VariableSummary};
use crate::units::{meters_to_nm, mps_to_knots};

/// Width labels are padded to in the text report
pub const LABEL_WIDTH: usize = 37;

/// Value of a report row
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ReportValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Text(text) => f.write_str(text),
            ReportValue::Integer(value) => write!(f, "{}", value),
            ReportValue::Number(value) => write!(f, "{}", value),
        }
    }
}

/// One named figure of the tabular projection
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReportRow {
    pub name: String,
    pub value: ReportValue,
    pub unit: Option<&'static str>,
}

impl ReportRow {
    fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ReportValue::Text(value.into()),
            unit: None,
        }
    }

    fn integer(name: impl Into<String>, value: i64, unit: Option<&'static str>) -> Self {
        Self {
            name: name.into(),
            value: ReportValue::Integer(value),
            unit,
        }
    }

    fn number(name: impl Into<String>, value: f64, unit: &'static str) -> Self {
        Self {
            name: name.into(),
            value: ReportValue::Number(value),
            unit: Some(unit),
        }
    }
}

fn utc_time(millis: f64) -> Option<String> {
    DateTime::from_timestamp_millis(millis as i64)
        .map(|time| time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

impl LogStatistics {
    /// Per-category, per-entity variable summaries
    ///
    /// Categories without any named entity are left out.
    pub fn variable_table(&self) -> BTreeMap<Category, BTreeMap<String, VariableSummary>> {
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                let table = self.variables(category)?;
                if table.named().is_empty() {
                    return None;
                }
                let entries = table
                    .named()
                    .iter()
                    .map(|(name, entry)| (name.clone(), entry.summary()))
                    .collect();
                Some((category, entries))
            })
            .collect()
    }

    /// Flat `(name, value, unit)` projection of the statistics
    ///
    /// Figures never observed come out as NaN. Without navigation data only
    /// the identification rows are produced.
    pub fn rows(&self) -> Vec<ReportRow> {
        let smooth = self.config().smooth_filter;
        let mut rows = vec![
            ReportRow::text("system_name", self.system_name().unwrap_or("Unknown")),
            ReportRow::text("source_id", format!("0x{:04X}", self.source_id())),
            ReportRow::text("log_names", self.log_names().join(", ")),
            ReportRow::text("log_days", self.log_days().join(", ")),
            ReportRow::integer("number_of_log_files", self.number_of_logs() as i64, None),
        ];
        if !self.has_data() {
            return rows;
        }

        rows.push(ReportRow::text("start_time", utc_time(self.start_millis()).unwrap_or_default()));
        rows.push(ReportRow::number("start_millis", self.start_millis(), "ms"));
        rows.push(ReportRow::text("end_time", utc_time(self.end_millis()).unwrap_or_default()));
        rows.push(ReportRow::number("end_millis", self.end_millis(), "ms"));

        if let Some(parts) = self.duration_parts() {
            rows.push(ReportRow::integer("duration_days", parts.days as i64, Some("days")));
            rows.push(ReportRow::integer("duration_hours", parts.hours as i64, Some("hours")));
            rows.push(ReportRow::integer("duration_minutes", parts.minutes as i64, Some("minutes")));
            rows.push(ReportRow::number("duration_seconds", parts.seconds, "seconds"));
        }

        rows.push(ReportRow::number("distance_travelled", self.distance(), "m"));
        rows.push(ReportRow::number("distance_travelled_nm", meters_to_nm(self.distance()), "NM"));
        if smooth {
            rows.push(ReportRow::number("distance_travelled_smoothed", self.distance_smoothed(), "m"));
            rows.push(ReportRow::number(
                "distance_travelled_smoothed_nm",
                meters_to_nm(self.distance_smoothed()),
                "NM",
            ));
            rows.push(ReportRow::integer(
                "smooth_window",
                self.config().sliding_window_size as i64,
                Some("elements"),
            ));
        }

        push_speed(&mut rows, "speed_calc_avg", self.avg_speed_mps_calc());
        if smooth {
            push_speed(&mut rows, "speed_calc_smoothed_avg", self.avg_speed_smoothed_mps_calc());
        }

        push_speed_entry(&mut rows, "speed", self.speed());
        if smooth {
            push_speed_entry(&mut rows, "speed_smoothed", self.speed_smoothed());
        }
        push_speed_entry(&mut rows, "vertical_speed", self.vertical_speed());
        if smooth {
            push_speed_entry(&mut rows, "vertical_speed_smoothed", self.vertical_speed_smoothed());
        }

        push_angle(&mut rows, "geospatial_lat", self.latitude(), None);
        push_angle(&mut rows, "geospatial_lon", self.longitude(), None);
        push_linear(&mut rows, "geospatial_height", self.height(), "m");
        push_linear(&mut rows, "geospatial_depth", self.depth(), "m");
        push_linear(&mut rows, "geospatial_alt", self.altitude(), "m");

        push_angle(&mut rows, "attitude_roll", self.roll(), Some(self.roll_amplitude()));
        push_angle(&mut rows, "attitude_pitch", self.pitch(), Some(self.pitch_amplitude()));
        push_angle(&mut rows, "sideslip", self.sideslip(), Some(self.sideslip_amplitude()));

        rows.push(ReportRow::number(
            "time_between_states_avg",
            self.avg_time_between_states(),
            "s",
        ));
        rows.push(ReportRow::integer("number_of_states", self.num_states() as i64, None));

        for (category, entities) in self.variable_table() {
            for (entity, summary) in entities {
                let prefix = format!("{}/{}", category, entity);
                let unit = category.unit();
                rows.push(ReportRow::number(format!("{}_min", prefix), summary.min, unit));
                rows.push(ReportRow::number(format!("{}_max", prefix), summary.max, unit));
                rows.push(ReportRow::number(format!("{}_amp", prefix), summary.amplitude(), unit));
                rows.push(ReportRow::number(format!("{}_avg", prefix), summary.mean, unit));
                rows.push(ReportRow::number(format!("{}_std_dev", prefix), summary.std_dev, unit));
            }
        }

        rows
    }

    /// Mean travelled time between consecutive fixes (s)
    pub fn avg_time_between_states(&self) -> f64 {
        if self.num_states() == 0 {
            return f64::NAN;
        }
        self.duration_travelled_millis() / self.num_states() as f64 / 1000.0
    }
}

fn push_speed(rows: &mut Vec<ReportRow>, name: &str, mps: f64) {
    rows.push(ReportRow::number(name, mps, "m/s"));
    rows.push(ReportRow::number(format!("{}_kn", name), mps_to_knots(mps), "kn"));
}

fn push_speed_entry(rows: &mut Vec<ReportRow>, name: &str, entry: &VariableEntry) {
    let summary = entry.summary();
    push_speed(rows, &format!("{}_min", name), summary.min);
    push_speed(rows, &format!("{}_max", name), summary.max);
    push_speed(rows, &format!("{}_avg", name), nan_if_empty(entry, summary.mean));
    push_speed(rows, &format!("{}_std_dev", name), nan_if_empty(entry, summary.std_dev));
}

fn push_linear(rows: &mut Vec<ReportRow>, name: &str, entry: &VariableEntry, unit: &'static str) {
    let summary = entry.summary();
    rows.push(ReportRow::number(format!("{}_min", name), summary.min, unit));
    rows.push(ReportRow::number(format!("{}_max", name), summary.max, unit));
    rows.push(ReportRow::number(format!("{}_avg", name), nan_if_empty(entry, summary.mean), unit));
    rows.push(ReportRow::number(
        format!("{}_std_dev", name),
        nan_if_empty(entry, summary.std_dev),
        unit,
    ));
}

fn push_angle(rows: &mut Vec<ReportRow>, name: &str, angle: &AngleStats, amplitude: Option<f64>) {
    let degrees = |rad: Option<f64>| rad.map_or(f64::NAN, f64::to_degrees);
    let observed = |value: f64| if angle.is_empty() { f64::NAN } else { value };

    rows.push(ReportRow::number(format!("{}_min", name), degrees(angle.extrema.min()), "°"));
    rows.push(ReportRow::number(format!("{}_max", name), degrees(angle.extrema.max()), "°"));
    if let Some(amplitude) = amplitude {
        rows.push(ReportRow::number(format!("{}_amp", name), amplitude.to_degrees(), "°"));
    }
    rows.push(ReportRow::number(
        format!("{}_avg", name),
        observed(angle.circular.mean().to_degrees()),
        "°",
    ));
    rows.push(ReportRow::number(
        format!("{}_std_dev", name),
        observed(angle.circular.std_dev().to_degrees()),
        "°",
    ));
}

fn nan_if_empty(entry: &VariableEntry, value: f64) -> f64 {
    if entry.is_empty() {
        f64::NAN
    } else {
        value
    }
}

struct Label<'a>(&'a str);

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<width$}", self.0, width = LABEL_WIDTH)
    }
}

fn write_speed_line(f: &mut fmt::Formatter<'_>, label: &str, entry: &VariableEntry) -> fmt::Result {
    let s = entry.summary();
    writeln!(
        f,
        "{}: Min: {:.2} m/s : {:.2} kn | Max: {:.2} m/s : {:.2} kn | Avg: {:.2} m/s : {:.2} kn | Std Dev: {:.2} m/s : {:.2} kn",
        Label(label),
        s.min,
        mps_to_knots(s.min),
        s.max,
        mps_to_knots(s.max),
        s.mean,
        mps_to_knots(s.mean),
        s.std_dev,
        mps_to_knots(s.std_dev)
    )
}

fn write_attitude_line(f: &mut fmt::Formatter<'_>, label: &str, angle: &AngleStats, amplitude: f64) -> fmt::Result {
    writeln!(
        f,
        "{}: Min: {:.2}° | Max: {:.2}° | Amp: {:.2}° | Avg: {:.2}° | Std Dev: {:.2}°",
        Label(label),
        angle.extrema.min_or_nan().to_degrees(),
        angle.extrema.max_or_nan().to_degrees(),
        amplitude.to_degrees(),
        angle.circular.mean().to_degrees(),
        angle.circular.std_dev().to_degrees()
    )
}

impl fmt::Display for LogStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let smooth = self.config().smooth_filter;

        writeln!(f, "{}: {}", Label("Log Name"), self.log_names().join(", "))?;
        writeln!(f, "{}: {}", Label("Log Days"), self.log_days().join(", "))?;
        writeln!(
            f,
            "{}: {} | Source ID: {} (0x{:04X})",
            Label("System Name"),
            self.system_name().unwrap_or(""),
            self.source_id(),
            self.source_id()
        )?;

        if !self.has_data() {
            return write!(f, "No data found in the logs.");
        }

        let time = |millis: f64| utc_time(millis).unwrap_or_else(|| format!("{} ms", millis));
        writeln!(f, "{}: {}", Label("Start time"), time(self.start_millis()))?;
        writeln!(f, "{}: {}", Label("End time"), time(self.end_millis()))?;
        if let Some(parts) = self.duration_parts() {
            writeln!(
                f,
                "{}: {} days, {} hours, {} minutes, {:.3} seconds",
                Label("Duration"),
                parts.days,
                parts.hours,
                parts.minutes,
                parts.seconds
            )?;
        }

        writeln!(
            f,
            "{}: {:.1} m | {:.2} NM",
            Label("Distance"),
            self.distance(),
            meters_to_nm(self.distance())
        )?;
        if smooth {
            writeln!(
                f,
                "{}: {:.1} m | {:.2} NM",
                Label("Distance Smoothed"),
                self.distance_smoothed(),
                meters_to_nm(self.distance_smoothed())
            )?;
            writeln!(
                f,
                "{}: {} elements",
                Label("Smooth Window"),
                self.config().sliding_window_size
            )?;
        }

        writeln!(
            f,
            "{}: {:.2} m/s : {:.2} kn",
            Label("Average Speed Calc by Time"),
            self.avg_speed_mps_calc(),
            mps_to_knots(self.avg_speed_mps_calc())
        )?;
        if smooth {
            writeln!(
                f,
                "{}: {:.2} m/s : {:.2} kn",
                Label("Average Speed Calc by Time Smoothed"),
                self.avg_speed_smoothed_mps_calc(),
                mps_to_knots(self.avg_speed_smoothed_mps_calc())
            )?;
        }

        write_speed_line(f, "Speed", self.speed())?;
        if smooth {
            write_speed_line(f, "Speed Smoothed", self.speed_smoothed())?;
        }
        if !self.vertical_speed().is_empty() {
            write_speed_line(f, "Vertical Speed", self.vertical_speed())?;
            if smooth {
                write_speed_line(f, "Vertical Speed Smoothed", self.vertical_speed_smoothed())?;
            }
        }

        for (label, angle) in [("Latitude", self.latitude()), ("Longitude", self.longitude())] {
            if angle.is_empty() {
                continue;
            }
            writeln!(
                f,
                "{}: Min: {:.7}° | Max: {:.7}° | Avg: {:.7}° | Std Dev: {:.7}°",
                Label(label),
                angle.extrema.min_or_nan().to_degrees(),
                angle.extrema.max_or_nan().to_degrees(),
                angle.circular.mean().to_degrees(),
                angle.circular.std_dev().to_degrees()
            )?;
        }

        let height = self.height().summary();
        if height.count > 0 {
            writeln!(
                f,
                "{}: Min: {:.1} m | Max: {:.1} m | Avg: {:.1} m | Std Dev: {:.1} m",
                Label("Height"),
                height.min,
                height.max,
                height.mean,
                height.std_dev
            )?;
        }
        for (label, entry) in [("Depth", self.depth()), ("Altitude", self.altitude())] {
            let s = entry.summary();
            if s.count == 0 {
                continue;
            }
            writeln!(
                f,
                "{}: Max: {:.1} m | Avg: {:.1} m | Std Dev: {:.1} m",
                Label(label),
                s.max,
                s.mean,
                s.std_dev
            )?;
        }

        if !self.roll().is_empty() {
            write_attitude_line(f, "Roll", self.roll(), self.roll_amplitude())?;
        }
        if !self.pitch().is_empty() {
            write_attitude_line(f, "Pitch", self.pitch(), self.pitch_amplitude())?;
        }
        if !self.sideslip().is_empty() {
            write_attitude_line(f, "Sideslip", self.sideslip(), self.sideslip_amplitude())?;
        }

        writeln!(
            f,
            "{}: {:.3} s",
            Label("Average Time Between States"),
            self.avg_time_between_states()
        )?;
        writeln!(f, "{}: {}", Label("Number of States"), self.num_states())?;
        write!(f, "{}: {}", Label("Number of Log Files"), self.number_of_logs())?;

        let table = self.variable_table();
        if !table.is_empty() {
            write!(f, "\n{}:", Label("Variables"))?;
        }
        for (category, entities) in table {
            let unit = category.unit();
            write!(f, "\n  {}:", Label(category.name()))?;
            for (entity, s) in entities {
                write!(
                    f,
                    "\n    {}: Min: {:.2} {unit} | Max: {:.2} {unit} | Amp: {:.2} {unit} | Avg: {:.2} {unit} | Std Dev: {:.2} {unit}",
                    Label(&entity),
                    s.min,
                    s.max,
                    s.amplitude(),
                    s.mean,
                    s.std_dev,
                    unit = unit
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{EntityFilter, SensorEvent, StateFix, StatsConfig};

    const SRC: u16 = 0x2001;

    fn sample() -> LogStatistics {
        let config = StatsConfig::new(SRC)
            .with_smoothing(5)
            .with_voltage_entities(EntityFilter::All);
        let mut stats = LogStatistics::new(config).unwrap();
        stats.new_log_name("mission-1");
        stats.register_entity("Batteries", 4);
        stats.update(&SensorEvent::announce(SRC, 0.0, "auv-1"));
        for i in 0..5 {
            let fix = StateFix {
                vx: 1.0,
                phi: 0.01 * i as f64,
                depth: 2.0,
                ..StateFix::at(0.5 + i as f64 * 1e-5, 0.1)
            };
            stats.update(&SensorEvent::state(SRC, i as f64, fix));
            stats.update(&SensorEvent::voltage(SRC, 4, i as f64, 24.0 - 0.1 * i as f64));
        }
        stats.finalize();
        stats
    }

    fn find<'a>(rows: &'a [ReportRow], name: &str) -> &'a ReportRow {
        rows.iter()
            .find(|row| row.name == name)
            .unwrap_or_else(|| panic!("missing row {}", name))
    }

    #[test]
    fn test_display_labels_are_padded() {
        let text = sample().to_string();
        assert!(text.starts_with(&format!("{:<37}: 19700101/mission-1", "Log Name")));
        assert!(text.contains("auv-1 | Source ID: 8193 (0x2001)"));
        assert!(text.contains("Distance Smoothed"));
        assert!(text.contains(&format!("{:<37}: 5", "Number of States")));
        assert!(text.contains("  Voltage"));
        assert!(text.contains(" V | Max: 24.00 V"));
    }

    #[test]
    fn test_display_without_data() {
        let stats = LogStatistics::new(StatsConfig::new(SRC)).unwrap();
        let text = stats.to_string();
        assert!(text.ends_with("No data found in the logs."));
    }

    #[test]
    fn test_rows_project_state() {
        let stats = sample();
        let rows = stats.rows();

        assert_eq!(find(&rows, "system_name").value, ReportValue::Text("auv-1".into()));
        assert_eq!(find(&rows, "number_of_states").value, ReportValue::Integer(5));
        assert_eq!(
            find(&rows, "distance_travelled").value,
            ReportValue::Number(stats.distance())
        );
        assert_eq!(find(&rows, "speed_calc_avg_kn").unit, Some("kn"));
        assert_eq!(find(&rows, "geospatial_depth_max").value, ReportValue::Number(2.0));
        assert_eq!(find(&rows, "Voltage/Batteries_max").value, ReportValue::Number(24.0));
        assert_eq!(find(&rows, "Voltage/Batteries_min").unit, Some("V"));
    }

    #[test]
    fn test_rows_unobserved_are_nan() {
        let stats = sample();
        let rows = stats.rows();
        match find(&rows, "geospatial_alt_avg").value {
            ReportValue::Number(v) => assert!(v.is_nan()),
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rows_without_data() {
        let stats = LogStatistics::new(StatsConfig::new(SRC)).unwrap();
        let rows = stats.rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(find(&rows, "source_id").value, ReportValue::Text("0x2001".into()));
    }

    #[test]
    fn test_variable_table() {
        let table = sample().variable_table();
        assert_eq!(table.len(), 1);
        let batteries = table[&Category::Voltage]["Batteries"];
        assert_eq!(batteries.count, 5);
        assert!((batteries.min - 23.6).abs() < 1e-9);
        assert!((batteries.mean - 23.8).abs() < 1e-9);
    }
}
