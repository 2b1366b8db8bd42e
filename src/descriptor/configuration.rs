//! Priority-ordered service configuration layers.
//!
//! # Design Decisions
//! - Precedence is an explicit priority, not an insertion position
//! - Within one priority, the most recently inserted layer is consulted first
//! - Lookup is first-match across layers in priority order

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys a configuration layer may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKey {
    ServiceName,
    PortName,
    TargetNamespace,
    WsdlLocation,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigKey::ServiceName => "service_name",
            ConfigKey::PortName => "port_name",
            ConfigKey::TargetNamespace => "target_namespace",
            ConfigKey::WsdlLocation => "wsdl_location",
        };
        f.write_str(s)
    }
}

/// Precedence of a layer. Lower variants are consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerPriority {
    /// Deployment-supplied values; shadow everything else.
    Override,
    /// Values derived from the implementation class.
    Reflected,
}

/// One source of configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationLayer {
    pub source: String,
    pub priority: LayerPriority,
    pub values: BTreeMap<ConfigKey, String>,
}

impl ConfigurationLayer {
    pub fn new(source: impl Into<String>, priority: LayerPriority) -> Self {
        Self {
            source: source.into(),
            priority,
            values: BTreeMap::new(),
        }
    }

    /// Set `key` when `value` is present and non-empty.
    pub fn with(mut self, key: ConfigKey, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value.map(Into::into).filter(|v: &String| !v.is_empty()) {
            self.values.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }
}

/// All configuration layers of a description, kept in lookup order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceConfigurations {
    layers: Vec<ConfigurationLayer>,
}

impl ServiceConfigurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert ahead of every layer with the same or lower precedence.
    pub fn insert(&mut self, layer: ConfigurationLayer) {
        let at = self.layers.partition_point(|l| l.priority < layer.priority);
        self.layers.insert(at, layer);
    }

    /// First value for `key` in precedence order.
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// Layer that supplies the effective value for `key`.
    pub fn source_of(&self, key: ConfigKey) -> Option<&str> {
        self.layers
            .iter()
            .find(|layer| layer.get(key).is_some())
            .map(|layer| layer.source.as_str())
    }

    pub fn layers(&self) -> &[ConfigurationLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
