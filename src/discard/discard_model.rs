use std::time::{SystemTime, UNIX_EPOCH};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::key::normalize::{normalize_segment, parse_key, scenario_key};

// ============================================================================
// Discard status: reviewer decisions keyed by scenario / feature key
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardStatus {
    Discarded,
    Active,
}

/// One reviewer decision.
///
/// Without `scenario_name` the entry applies to the whole feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardEntry {
    pub status: DiscardStatus,

    #[serde(rename = "extName", default)]
    pub ext_name: String,

    #[serde(rename = "featureName", default)]
    pub feature_name: String,

    #[serde(rename = "scenarioName", default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,

    /// Unix epoch milliseconds of the decision
    #[serde(default)]
    pub timestamp: u64,
}

impl DiscardEntry {
    pub fn is_discarded(&self) -> bool {
        self.status == DiscardStatus::Discarded
    }

    pub fn is_feature_level(&self) -> bool {
        self.scenario_name.is_none()
    }
}

/// Normalized (ext, feature, scenario?) segments an entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscardTarget {
    pub ext: String,
    pub feature: String,
    pub scenario: Option<String>,
}

impl DiscardTarget {
    /// Resolve the target of an entry.
    ///
    /// The entry's own name fields win. The map key is only consulted when
    /// those are empty, since older writers produced keys that do not match
    /// the current normalization.
    pub fn of(key: &str, entry: &DiscardEntry) -> Option<Self> {
        if !entry.ext_name.is_empty() && !entry.feature_name.is_empty() {
            return Some(Self {
                ext: normalize_segment(&entry.ext_name),
                feature: normalize_segment(&entry.feature_name),
                scenario: entry.scenario_name.as_deref().map(normalize_segment),
            });
        }

        let (ext, feature, scenario) = parse_key(key)?;
        Some(Self {
            ext,
            feature,
            scenario,
        })
    }
}

/// Ordered map of discard key → entry.
///
/// Insertion order is kept so that an exported snapshot lists entries in
/// the order reviewers made them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscardMap {
    entries: Vec<(String, DiscardEntry)>,
}

impl DiscardMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&DiscardEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiscardEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Insert or replace an entry; a replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, entry: DiscardEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    /// Copy of this map with one more reviewer decision applied.
    ///
    /// An existing entry for the same target is replaced in place and keeps
    /// its key, even when that key came from an older normalizer. Any other
    /// entries for the target are dropped, so the map holds exactly one
    /// decision per target. A new target is stored under its normalized key.
    pub fn with_decision(
        &self,
        ext: &str,
        feature: &str,
        scenario: Option<&str>,
        status: DiscardStatus,
        timestamp: u64,
    ) -> Self {
        let entry = DiscardEntry {
            status,
            ext_name: ext.to_string(),
            feature_name: feature.to_string(),
            scenario_name: scenario.map(str::to_string),
            timestamp,
        };
        let key = scenario_key(ext, feature, scenario);
        let Some(target) = DiscardTarget::of(&key, &entry) else {
            let mut next = self.clone();
            next.insert(key, entry);
            return next;
        };

        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        let mut pending = Some(entry);
        for (k, e) in &self.entries {
            if DiscardTarget::of(k, e).as_ref() != Some(&target) {
                entries.push((k.clone(), e.clone()));
            } else if let Some(replacement) = pending.take() {
                entries.push((k.clone(), replacement));
            }
        }

        let mut next = Self { entries };
        if let Some(entry) = pending {
            next.insert(key, entry);
        }
        next
    }

    /// Keys of every entry pointing at `target`, in map order.
    pub fn keys_for(&self, target: &DiscardTarget) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, e)| DiscardTarget::of(k, e).as_ref() == Some(target))
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

impl Serialize for DiscardMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

impl FromIterator<(String, DiscardEntry)> for DiscardMap {
    fn from_iter<I: IntoIterator<Item = (String, DiscardEntry)>>(iter: I) -> Self {
        let mut map = DiscardMap::new();
        for (key, entry) in iter {
            map.insert(key, entry);
        }
        map
    }
}

/// Current time as Unix epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
