//! Service description construction.
//!
//! # Responsibilities
//! - Resolve the deployment binding id (only when one is given)
//! - Assemble configuration layers: class metadata, then the deployment override
//! - Delegate to a [`DescriptionEngine`] for the description itself
//!
//! # Design Decisions
//! - The deployment layer is always forced to override priority
//! - Engine failures are deployment-fatal and surface as-is

use serde::Serialize;

use crate::descriptor::binding::{self, binding_uri};
use crate::descriptor::configuration::{ConfigKey, ConfigurationLayer, LayerPriority, ServiceConfigurations};
use crate::descriptor::error::DescriptorError;
use crate::injection::class::{OperationInfo, ServiceClass};
use crate::BoxError;

/// Describes a published service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDescription {
    pub class_name: String,
    pub binding_uri: String,
    pub service_name: String,
    pub port_name: String,
    pub target_namespace: String,
    pub wsdl_location: Option<String>,
    pub operations: Vec<OperationInfo>,
    pub configurations: ServiceConfigurations,
}

impl ServiceDescription {
    pub fn operation(&self, name: &str) -> Option<&OperationInfo> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// Collaborator that turns a class plus configuration into a description.
pub trait DescriptionEngine: Send + Sync {
    fn build(
        &self,
        class: &ServiceClass,
        binding_uri: Option<&str>,
        configurations: ServiceConfigurations,
    ) -> Result<ServiceDescription, BoxError>;
}

/// Engine that derives everything from class metadata and configuration layers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectiveEngine;

impl DescriptionEngine for ReflectiveEngine {
    fn build(
        &self,
        class: &ServiceClass,
        binding_uri: Option<&str>,
        configurations: ServiceConfigurations,
    ) -> Result<ServiceDescription, BoxError> {
        if class.operations().is_empty() {
            return Err(format!("unsupported implementation shape: {} exposes no operations", class.name()).into());
        }

        let simple = class.simple_name();
        let value = |key: ConfigKey| configurations.get(key).map(str::to_string);

        Ok(ServiceDescription {
            class_name: class.name().to_string(),
            binding_uri: binding_uri.unwrap_or(binding::SOAP11_HTTP).to_string(),
            service_name: value(ConfigKey::ServiceName).unwrap_or_else(|| format!("{}Service", simple)),
            port_name: value(ConfigKey::PortName).unwrap_or_else(|| format!("{}Port", simple)),
            target_namespace: value(ConfigKey::TargetNamespace).unwrap_or_else(|| default_namespace(class.name())),
            wsdl_location: value(ConfigKey::WsdlLocation),
            operations: class.operations().to_vec(),
            configurations,
        })
    }
}

/// `com.example.Foo` → `http://example.com/`.
fn default_namespace(class_name: &str) -> String {
    let mut package: Vec<&str> = class_name.split('.').collect();
    package.pop();
    if package.is_empty() {
        return "http://default/".to_string();
    }
    package.reverse();
    format!("http://{}/", package.join("."))
}

/// Builds descriptions for one engine.
pub struct ServiceDescriptorBuilder<'a> {
    engine: &'a dyn DescriptionEngine,
}

impl<'a> ServiceDescriptorBuilder<'a> {
    pub fn new(engine: &'a dyn DescriptionEngine) -> Self {
        Self { engine }
    }

    /// Build the description of `class`, with `caller` shadowing class metadata.
    pub fn build(
        &self,
        class: &ServiceClass,
        binding_id: Option<&str>,
        mut caller: ConfigurationLayer,
    ) -> Result<ServiceDescription, DescriptorError> {
        let binding_uri = binding_uri(binding_id)?;

        let mut configurations = ServiceConfigurations::new();
        configurations.insert(reflected_layer(class));
        caller.priority = LayerPriority::Override;
        configurations.insert(caller);

        let description = self
            .engine
            .build(class, binding_uri.as_deref(), configurations)
            .map_err(|source| DescriptorError::Engine {
                class: class.name().to_string(),
                source,
            })?;

        tracing::debug!(
            class = %class.name(),
            service = %description.service_name,
            port = %description.port_name,
            binding = %description.binding_uri,
            "Service description built"
        );
        Ok(description)
    }
}

fn reflected_layer(class: &ServiceClass) -> ConfigurationLayer {
    let mut layer = ConfigurationLayer::new(class.name(), LayerPriority::Reflected);
    layer.values.extend(class.annotations().iter().map(|(k, v)| (*k, v.clone())));
    layer
}
