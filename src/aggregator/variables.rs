//! Per-entity scalar variables (voltage, current, temperature, ...)
//!
//! Samples are keyed by entity name once the directory of the log is known.
//! Until then they are parked under the raw entity id and folded into the
//! named table by [`reconcile`].

use std::collections::BTreeMap;
use std::fmt;

use super::entity::{EntityFilter, EntityMap};
use super::event::EntityId;
use crate::statistics::{Extrema, MeanStats};

/// Scalar variable families collected per entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Voltage,
    Current,
    Temperature,
    DisplacementZ,
}

impl Category {
    /// Every category, in report order
    pub const ALL: [Category; 4] = [
        Category::Voltage,
        Category::Current,
        Category::Temperature,
        Category::DisplacementZ,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Voltage => "Voltage",
            Category::Current => "Current",
            Category::Temperature => "Temperature",
            Category::DisplacementZ => "DisplacementZ",
        }
    }

    /// Unit suffix used in reports
    pub fn unit(&self) -> &'static str {
        match self {
            Category::Voltage => "V",
            Category::Current => "A",
            Category::Temperature => "°C",
            Category::DisplacementZ => "m",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running statistics of one variable of one entity
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableEntry {
    pub extrema: Extrema,
    pub avg: MeanStats,
}

impl VariableEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.extrema.update(value);
        self.avg.update(value);
    }

    /// Fold another entry in, as if its samples had been pushed here
    pub fn merge_with(&mut self, other: &VariableEntry) -> &mut Self {
        self.extrema.merge_with(&other.extrema);
        self.avg.merge_with(&other.avg);
        self
    }

    pub fn len(&self) -> u64 {
        self.avg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avg.is_empty()
    }

    pub fn summary(&self) -> VariableSummary {
        VariableSummary {
            min: self.extrema.min_or_nan(),
            max: self.extrema.max_or_nan(),
            mean: self.avg.mean(),
            std_dev: self.avg.std_dev(),
            count: self.avg.len(),
        }
    }
}

/// Read-back view of a [`VariableEntry`]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VariableSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub count: u64,
}

impl VariableSummary {
    /// `max - min`, NaN when nothing was recorded
    pub fn amplitude(&self) -> f64 {
        self.max - self.min
    }
}

/// Named and not-yet-named entries of one category
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableTable {
    named: BTreeMap<String, VariableEntry>,
    pending: BTreeMap<EntityId, VariableEntry>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample for a resolved entity
    pub fn update_named(&mut self, name: &str, value: f64) {
        match self.named.get_mut(name) {
            Some(entry) => entry.update(value),
            None => {
                let mut entry = VariableEntry::new();
                entry.update(value);
                self.named.insert(name.to_string(), entry);
            }
        }
    }

    /// Record a sample for an entity whose name is not known yet
    pub fn update_pending(&mut self, id: EntityId, value: f64) {
        self.pending.entry(id).or_default().update(value);
    }

    pub fn named(&self) -> &BTreeMap<String, VariableEntry> {
        &self.named
    }

    pub fn pending(&self) -> &BTreeMap<EntityId, VariableEntry> {
        &self.pending
    }

    pub fn get(&self, name: &str) -> Option<&VariableEntry> {
        self.named.get(name)
    }

    /// Move pending entries into the named table and drop the rest
    pub fn reconcile(&mut self, filter: &EntityFilter, entities: &EntityMap) {
        let named = std::mem::take(&mut self.named);
        self.named = reconcile(filter, entities, named, &self.pending);
        self.pending.clear();
    }

    /// Merge the named entries of another table
    ///
    /// Pending entries belong to a single log's directory and are not merged.
    pub fn merge_named(&mut self, other: &VariableTable) {
        for (name, entry) in &other.named {
            match self.named.get_mut(name) {
                Some(existing) => {
                    existing.merge_with(entry);
                }
                None => {
                    self.named.insert(name.clone(), entry.clone());
                }
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Fold pending entries into `named` for every entity the filter selects
///
/// Entities the filter selects but the directory doesn't know, and pending
/// ids without a selected name, are left out. Entries already present under
/// the name are merged with the pending ones.
pub fn reconcile(
    filter: &EntityFilter,
    entities: &EntityMap,
    mut named: BTreeMap<String, VariableEntry>,
    pending: &BTreeMap<EntityId, VariableEntry>,
) -> BTreeMap<String, VariableEntry> {
    if pending.is_empty() {
        return named;
    }

    for name in filter.selected(entities) {
        let Some(id) = entities.id_of(name) else {
            continue;
        };
        let Some(entry) = pending.get(&id) else {
            continue;
        };

        log::trace!("adopting {} pending samples for entity {} ({})", entry.len(), name, id);
        match named.get_mut(name) {
            Some(existing) => {
                existing.merge_with(entry);
            }
            None => {
                named.insert(name.to_string(), entry.clone());
            }
        }
    }

    named
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(values: &[f64]) -> VariableEntry {
        let mut e = VariableEntry::new();
        for &v in values {
            e.update(v);
        }
        e
    }

    #[test]
    fn test_category_units() {
        assert_eq!(Category::Voltage.unit(), "V");
        assert_eq!(Category::Current.unit(), "A");
        assert_eq!(Category::Temperature.unit(), "°C");
        assert_eq!(Category::DisplacementZ.unit(), "m");
        assert_eq!(Category::DisplacementZ.to_string(), "DisplacementZ");
    }

    #[test]
    fn test_entry_summary() {
        let s = entry(&[24.0, 25.0, 26.0]).summary();
        assert_eq!(s.min, 24.0);
        assert_eq!(s.max, 26.0);
        assert!((s.mean - 25.0).abs() < 1e-12);
        assert_eq!(s.count, 3);
        assert_eq!(s.amplitude(), 2.0);

        let empty = VariableEntry::new().summary();
        assert!(empty.min.is_nan());
        assert_eq!(empty.count, 0);
    }

    #[test]
    fn test_reconcile_adopts_pending() {
        let entities: EntityMap = [("Batteries", 12u8), ("CPU", 3u8)].into_iter().collect();
        let filter = EntityFilter::from_names(["Batteries"]);

        let mut pending = BTreeMap::new();
        pending.insert(12, entry(&[24.0, 23.0]));
        pending.insert(3, entry(&[5.0]));

        let named = reconcile(&filter, &entities, BTreeMap::new(), &pending);
        assert_eq!(named.len(), 1);
        let batteries = &named["Batteries"];
        assert_eq!(batteries.extrema.min(), Some(23.0));
        assert_eq!(batteries.len(), 2);
    }

    #[test]
    fn test_reconcile_merges_with_named() {
        let entities: EntityMap = [("Batteries", 12u8)].into_iter().collect();

        let mut named = BTreeMap::new();
        named.insert("Batteries".to_string(), entry(&[25.0, 26.0]));
        let mut pending = BTreeMap::new();
        pending.insert(12, entry(&[20.0]));

        let named = reconcile(&EntityFilter::All, &entities, named, &pending);
        let s = named["Batteries"].summary();
        assert_eq!(s.min, 20.0);
        assert_eq!(s.max, 26.0);
        assert_eq!(s.count, 3);
        assert!((s.mean - 71.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_table_reconcile_is_idempotent() {
        let entities: EntityMap = [("Batteries", 12u8)].into_iter().collect();
        let filter = EntityFilter::All;

        let mut table = VariableTable::new();
        table.update_pending(12, 24.0);
        table.update_pending(12, 22.0);
        table.update_pending(99, 1.0);

        table.reconcile(&filter, &entities);
        let once = table.clone();
        table.reconcile(&filter, &entities);

        assert_eq!(table, once);
        assert!(!table.has_pending());
        assert_eq!(table.named().len(), 1);
        assert_eq!(table.get("Batteries").map(VariableEntry::len), Some(2));
    }

    #[test]
    fn test_merge_named_skips_pending() {
        let mut a = VariableTable::new();
        a.update_named("Batteries", 24.0);

        let mut b = VariableTable::new();
        b.update_named("Batteries", 20.0);
        b.update_named("CPU", 3.3);
        b.update_pending(7, 1.0);

        a.merge_named(&b);
        assert_eq!(a.get("Batteries").map(VariableEntry::len), Some(2));
        assert!(a.get("CPU").is_some());
        assert!(!a.has_pending());
    }
}
