//! Process-wide settings snapshots.
//!
//! # Responsibilities
//! - Hold the flat `key → value` settings map the host runs with
//! - Hand out immutable snapshots to endpoint bring-ups
//! - Swap in a new snapshot on reload without blocking readers
//!
//! # Design Decisions
//! - Nested TOML tables flatten to dotted keys (`a.b.c`)
//! - Snapshots are never mutated; reload replaces the whole map
//! - Lifecycles receive a snapshot explicitly, there is no global

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Immutable view of all settings at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSnapshot {
    entries: BTreeMap<String, String>,
}

impl SettingsSnapshot {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Flatten a TOML table into dotted keys. Arrays join with commas.
    pub fn from_toml(table: &toml::Table) -> Self {
        let mut entries = BTreeMap::new();
        flatten("", table, &mut entries);
        Self { entries }
    }

    pub fn all_entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Read a boolean option. Unparseable values fall back to `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            Some(v) => {
                tracing::warn!(key, value = %v, "Ignoring non-boolean setting");
                default
            }
            None => default,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(child) => flatten(&full, child, out),
            other => {
                out.insert(full, scalar(other));
            }
        }
    }
}

fn scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Holder of the current settings snapshot.
#[derive(Debug, Default)]
pub struct SettingsStore {
    current: ArcSwap<SettingsSnapshot>,
}

impl SettingsStore {
    pub fn new(initial: SettingsSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The snapshot in effect right now.
    pub fn snapshot(&self) -> Arc<SettingsSnapshot> {
        self.current.load_full()
    }

    /// Replace the snapshot. In-flight bring-ups keep the one they started with.
    pub fn replace(&self, next: SettingsSnapshot) {
        tracing::info!(entries = next.len(), "Settings snapshot replaced");
        self.current.store(Arc::new(next));
    }
}
