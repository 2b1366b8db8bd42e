//! Published endpoint registry.
//!
//! # Responsibilities
//! - Build an [`EndpointLifecycle`] per deployment and start it
//! - Route invocations to active endpoints by port id
//! - Undeploy single endpoints or everything at shutdown
//!
//! # Design Decisions
//! - Bring-up happens outside the map; only active endpoints are inserted
//! - Each bring-up takes its own settings snapshot
//! - Endpoints sit behind their own lock; the map guard is dropped before
//!   any implementation code runs
//! - Undeploy waits only for in-flight invocations of the same port

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;

use crate::config::schema::PortDeployment;
use crate::config::settings::SettingsStore;
use crate::injection::ClassRegistry;
use crate::lifecycle::endpoint::{
    EndpointEnvironment, EndpointError, EndpointLifecycle, EndpointSummary, InvocationError, TeardownReport,
};
use crate::lifecycle::handlers::ConfiguredHandlerChain;
use crate::lifecycle::transport::LocalTransport;
use crate::naming::Resource;

/// Errors raised while publishing an endpoint.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no implementation class named `{0}` is registered")]
    UnknownClass(String),

    #[error("port `{0}` is already published")]
    DuplicatePort(String),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Shared handle onto one published endpoint.
type EndpointHandle = Arc<RwLock<EndpointLifecycle>>;

/// All endpoints published by this host.
pub struct EndpointRegistry {
    endpoints: DashMap<String, EndpointHandle>,
    classes: ClassRegistry,
    environment: EndpointEnvironment,
    settings: Arc<SettingsStore>,
}

impl EndpointRegistry {
    pub fn new(classes: ClassRegistry, environment: EndpointEnvironment, settings: Arc<SettingsStore>) -> Self {
        Self {
            endpoints: DashMap::new(),
            classes,
            environment,
            settings,
        }
    }

    /// Build, start and register the endpoint described by `deployment`.
    pub fn publish(&self, deployment: PortDeployment) -> Result<(), PublishError> {
        let port_id = deployment.port_id.clone();
        if self.endpoints.contains_key(&port_id) {
            return Err(PublishError::DuplicatePort(port_id));
        }

        let class = self
            .classes
            .get(&deployment.class)
            .ok_or_else(|| PublishError::UnknownClass(deployment.class.clone()))?;

        let handlers = Box::new(ConfiguredHandlerChain::new(&port_id, deployment.handlers.clone()));
        let transport = Box::new(LocalTransport::new(&port_id));
        let mut endpoint = EndpointLifecycle::new(class, deployment, self.environment.clone(), handlers, transport);

        let settings = self.settings.snapshot();
        endpoint.start(&settings)?;

        let mut duplicate = match self.endpoints.entry(port_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(endpoint)));
                return Ok(());
            }
            Entry::Occupied(_) => endpoint,
        };

        // Lost a race with a concurrent publish of the same port.
        let report = duplicate.stop();
        if !report.is_clean() {
            tracing::warn!(port_id = %port_id, faults = report.faults().len(), "Discarded duplicate endpoint stopped with faults");
        }
        Err(PublishError::DuplicatePort(port_id))
    }

    pub fn invoke(&self, port_id: &str, operation: &str, payload: Resource) -> Result<Resource, InvocationError> {
        let handle = self
            .handle(port_id)
            .ok_or_else(|| InvocationError::NotPublished(port_id.to_string()))?;
        let endpoint = handle.read();
        endpoint.invoke(operation, payload)
    }

    /// Stop and remove one endpoint. `None` if it was not published.
    ///
    /// Blocks until in-flight invocations of this port have returned.
    pub fn undeploy(&self, port_id: &str) -> Option<TeardownReport> {
        let (_, endpoint) = self.endpoints.remove(port_id)?;
        let report = endpoint.write().stop();
        Some(report)
    }

    /// Stop and remove every endpoint.
    pub fn stop_all(&self) -> Vec<(String, TeardownReport)> {
        let port_ids: Vec<String> = self.endpoints.iter().map(|e| e.key().clone()).collect();
        port_ids
            .into_iter()
            .filter_map(|port_id| self.undeploy(&port_id).map(|report| (port_id, report)))
            .collect()
    }

    /// Summaries of all published endpoints, sorted by port id.
    pub fn summaries(&self) -> Vec<EndpointSummary> {
        let handles: Vec<EndpointHandle> = self.endpoints.iter().map(|e| e.value().clone()).collect();
        let mut out: Vec<EndpointSummary> = handles.iter().map(|h| h.read().summary()).collect();
        out.sort_by(|a, b| a.port_id.cmp(&b.port_id));
        out
    }

    /// Clone the handle out so the shard guard is released immediately.
    fn handle(&self, port_id: &str) -> Option<EndpointHandle> {
        self.endpoints.get(port_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, port_id: &str) -> bool {
        self.endpoints.contains_key(port_id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }
}
