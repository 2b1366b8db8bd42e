//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the host.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::settings::SettingsSnapshot;
use crate::descriptor::configuration::{ConfigKey, ConfigurationLayer, LayerPriority};
use crate::injection::class::InjectionPoint;
use crate::naming::{InMemoryContext, Resource};

/// Root configuration for the endpoint host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Process-wide settings, flattened to dotted keys.
    pub settings: toml::Table,

    /// Naming tree: tables are contexts, other values are resources.
    pub naming: toml::Table,

    /// Endpoints to publish at startup.
    pub endpoints: Vec<PortDeployment>,
}

impl HostConfig {
    pub fn settings_snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::from_toml(&self.settings)
    }

    pub fn naming_context(&self) -> Result<InMemoryContext, serde_json::Error> {
        InMemoryContext::from_toml(&self.naming)
    }
}

/// Deployment metadata of one published port.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PortDeployment {
    /// Unique endpoint identifier.
    pub port_id: String,

    /// Fully-qualified implementation class name.
    pub class: String,

    /// Binding id (well-known short id or URI). Optional.
    #[serde(default)]
    pub binding_id: Option<String>,

    /// Overrides the class's service name.
    #[serde(default)]
    pub service_name: Option<String>,

    /// Overrides the class's port name.
    #[serde(default)]
    pub port_name: Option<String>,

    /// Overrides the class's target namespace.
    #[serde(default)]
    pub target_namespace: Option<String>,

    /// Overrides the class's WSDL location.
    #[serde(default)]
    pub wsdl_location: Option<String>,

    /// Injection points in addition to those the class declares.
    #[serde(default)]
    pub injections: Vec<InjectionPoint>,

    /// Explicit values for injection points, taking precedence over naming lookups.
    #[serde(default)]
    pub bindings: BTreeMap<String, Resource>,

    /// Handler names, initialized in order.
    #[serde(default)]
    pub handlers: Vec<String>,
}

impl PortDeployment {
    pub fn new(port_id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            class: class.into(),
            ..Self::default()
        }
    }

    /// The deployment's configuration layer, which shadows class metadata.
    pub fn configuration_layer(&self) -> ConfigurationLayer {
        ConfigurationLayer::new(format!("port:{}", self.port_id), LayerPriority::Override)
            .with(ConfigKey::ServiceName, self.service_name.clone())
            .with(ConfigKey::PortName, self.port_name.clone())
            .with(ConfigKey::TargetNamespace, self.target_namespace.clone())
            .with(ConfigKey::WsdlLocation, self.wsdl_location.clone())
    }

    /// Class-declared points merged with deployment points; a deployment
    /// point replaces a class point of the same name.
    pub fn declared_injections(&self, class_points: &[InjectionPoint]) -> Vec<InjectionPoint> {
        let mut merged: Vec<InjectionPoint> = class_points
            .iter()
            .filter(|p| !self.injections.iter().any(|d| d.name == p.name))
            .cloned()
            .collect();
        merged.extend(self.injections.iter().cloned());
        merged
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,

    /// Request timeout for admin calls.
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
            request_timeout_secs: 10,
        }
    }
}
