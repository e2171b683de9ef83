//! Entity directory and per-category entity filters

use std::collections::{BTreeMap, BTreeSet};

use super::event::EntityId;

/// Mapping between entity names and numeric entity ids
///
/// Filled from the directory message of a log, which may arrive before or
/// after the data it names. Lookups work both ways.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityMap {
    by_name: BTreeMap<String, EntityId>,
    by_id: BTreeMap<EntityId, String>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under `id`, replacing any previous binding of either
    pub fn insert(&mut self, name: impl Into<String>, id: EntityId) {
        let name = name.into();
        if let Some(old_id) = self.by_name.insert(name.clone(), id) {
            self.by_id.remove(&old_id);
        }
        if let Some(old_name) = self.by_id.insert(id, name.clone()) {
            if old_name != name {
                self.by_name.remove(&old_name);
            }
        }
    }

    /// Numeric id registered for `name`
    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    /// Name registered for `id`
    pub fn name_of(&self, id: EntityId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Entity names in lexical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// `(name, id)` pairs in lexical name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.by_name.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Copy every binding of `other` into this map
    pub fn extend_from(&mut self, other: &EntityMap) {
        for (name, id) in other.iter() {
            self.insert(name, id);
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_id.clear();
    }
}

impl<S: Into<String>> FromIterator<(S, EntityId)> for EntityMap {
    fn from_iter<I: IntoIterator<Item = (S, EntityId)>>(iter: I) -> Self {
        let mut map = EntityMap::new();
        for (name, id) in iter {
            map.insert(name, id);
        }
        map
    }
}

/// Which entities of a variable category are collected
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityFilter {
    /// Collect nothing
    #[default]
    Nothing,
    /// Collect the listed entity names
    Named(BTreeSet<String>),
    /// Collect every entity
    All,
}

impl EntityFilter {
    /// Build a filter from a list of entity names
    ///
    /// An empty list collects nothing. A list holding only `*` or `all`
    /// (any case) collects everything.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if names.is_empty() {
            return EntityFilter::Nothing;
        }
        if names.len() == 1 {
            if let Some(only) = names.iter().next() {
                if is_wildcard(only) {
                    return EntityFilter::All;
                }
            }
        }
        EntityFilter::Named(names)
    }

    /// Whether this filter collects anything at all
    pub fn is_active(&self) -> bool {
        match self {
            EntityFilter::Nothing => false,
            EntityFilter::Named(names) => !names.is_empty(),
            EntityFilter::All => true,
        }
    }

    /// Whether the entity `name` is collected
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            EntityFilter::Nothing => false,
            EntityFilter::Named(names) => names.contains(name),
            EntityFilter::All => true,
        }
    }

    /// Entity names this filter selects from `entities`
    pub fn selected<'a>(&'a self, entities: &'a EntityMap) -> Vec<&'a str> {
        match self {
            EntityFilter::Nothing => Vec::new(),
            EntityFilter::Named(names) => names.iter().map(String::as_str).collect(),
            EntityFilter::All => entities.names().collect(),
        }
    }
}

fn is_wildcard(name: &str) -> bool {
    name == "*" || name.eq_ignore_ascii_case("all")
}
