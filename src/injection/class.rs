//! Service implementation classes.
//!
//! A [`ServiceClass`] is the deployable unit: a no-argument factory plus the
//! metadata a description engine would otherwise reflect from annotations
//! (operations, service/port names, declared injection points).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::configuration::ConfigKey;
use crate::injection::framework::{FrameworkResource, ResourceRequest};
use crate::naming::Resource;
use crate::BoxError;

/// A live service object.
pub trait ServiceImplementation: Send + Sync {
    /// Apply one resolved application-level injection.
    fn inject(&mut self, point: &str, value: &Resource) -> Result<(), BoxError>;

    /// Called once after all application injections were applied.
    fn post_construct(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called once during teardown.
    fn pre_destroy(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Framework resources this implementation wants.
    fn framework_requests(&self) -> Vec<ResourceRequest> {
        Vec::new()
    }

    /// Apply one resolved framework resource.
    fn inject_framework(&mut self, request: &ResourceRequest, resource: FrameworkResource) -> Result<(), BoxError> {
        let _ = (request, resource);
        Ok(())
    }

    /// Serve one operation.
    fn invoke(&self, operation: &str, payload: Resource) -> Result<Resource, BoxError>;
}

/// No-argument constructor of an implementation.
pub type Factory = Arc<dyn Fn() -> Result<Box<dyn ServiceImplementation>, BoxError> + Send + Sync>;

/// A declared dependency of an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    /// Name the implementation receives the value under.
    pub name: String,

    /// Naming key to look the value up under (default: `env/<name>`).
    #[serde(default)]
    pub lookup: Option<String>,
}

impl InjectionPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: impl Into<String>) -> Self {
        self.lookup = Some(lookup.into());
        self
    }

    pub fn lookup_key(&self) -> String {
        match &self.lookup {
            Some(key) => key.clone(),
            None => format!("env/{}", self.name),
        }
    }
}

/// An operation exposed by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
    pub name: String,
    #[serde(default)]
    pub one_way: bool,
}

impl OperationInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            one_way: false,
        }
    }
}

/// Deployable service implementation type.
#[derive(Clone)]
pub struct ServiceClass {
    name: String,
    operations: Vec<OperationInfo>,
    injection_points: Vec<InjectionPoint>,
    annotations: BTreeMap<ConfigKey, String>,
    factory: Factory,
}

impl ServiceClass {
    /// `name` is the fully-qualified class name (dotted).
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ServiceImplementation>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            operations: Vec::new(),
            injection_points: Vec::new(),
            annotations: BTreeMap::new(),
            factory: Arc::new(factory),
        }
    }

    pub fn with_operation(mut self, operation: OperationInfo) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_injection(mut self, point: InjectionPoint) -> Self {
        self.injection_points.push(point);
        self
    }

    /// Class-level metadata, the equivalent of reflected annotations.
    pub fn with_annotation(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.annotations.insert(key, value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last dotted segment of the class name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn operations(&self) -> &[OperationInfo] {
        &self.operations
    }

    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }

    pub fn annotations(&self) -> &BTreeMap<ConfigKey, String> {
        &self.annotations
    }

    pub fn instantiate(&self) -> Result<Box<dyn ServiceImplementation>, BoxError> {
        (self.factory)()
    }
}

impl fmt::Debug for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClass")
            .field("name", &self.name)
            .field("operations", &self.operations)
            .field("injection_points", &self.injection_points)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

/// Classes available for deployment, keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, Arc<ServiceClass>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, replacing any previous class of the same name.
    pub fn register(&mut self, class: ServiceClass) {
        self.classes.insert(class.name().to_string(), Arc::new(class));
    }

    pub fn get(&self, name: &str) -> Option<Arc<ServiceClass>> {
        self.classes.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
