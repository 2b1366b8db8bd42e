//! Endpoint lifecycle orchestration.
//!
//! # Bring-up (`start`)
//! ```text
//! settings snapshot → resolver (feature view, class properties)
//!     → ServiceDescriptorBuilder        (DescriptorBuild on failure)
//!     → InjectionLifecycle::bring_up    (EndpointInitialization on failure)
//!     → HandlerChain::initialize        (pre-destroy rollback, then HandlerInitialization)
//!     → Active
//! ```
//!
//! # Teardown (`stop`)
//! ```text
//! HandlerChain::destroy → pre-destroy → Transport::stop → Stopped
//! ```
//! Every teardown step runs even if an earlier one failed; faults are
//! collected in a [`TeardownReport`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::resolver;
use crate::config::schema::PortDeployment;
use crate::config::settings::SettingsSnapshot;
use crate::descriptor::{DescriptionEngine, DescriptorError, ServiceDescription, ServiceDescriptorBuilder};
use crate::injection::framework::{InvocationScope, MessageContext, ResourceResolverChain};
use crate::injection::{InjectionError, InjectionLifecycle, LiveInstance, ServiceClass};
use crate::lifecycle::handlers::HandlerChain;
use crate::lifecycle::transport::Transport;
use crate::naming::{NamingContext, Resource};
use crate::observability::metrics;
use crate::BoxError;

/// Externally visible state of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointState {
    /// Created, never started.
    Deployed,
    Active,
    /// Bring-up failed and was rolled back.
    Failed,
    Stopped,
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndpointState::Deployed => "deployed",
            EndpointState::Active => "active",
            EndpointState::Failed => "failed",
            EndpointState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Fatal bring-up errors.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to build service description for `{port_id}`")]
    DescriptorBuild {
        port_id: String,
        #[source]
        source: DescriptorError,
    },

    #[error("service resource injection failed for `{port_id}`")]
    EndpointInitialization {
        port_id: String,
        #[source]
        source: InjectionError,
    },

    #[error("error configuring handlers for `{port_id}`")]
    HandlerInitialization {
        port_id: String,
        #[source]
        source: BoxError,
    },

    #[error("endpoint `{port_id}` cannot start from state {state}")]
    InvalidState { port_id: String, state: EndpointState },
}

impl EndpointError {
    fn metric_label(&self) -> &'static str {
        match self {
            EndpointError::DescriptorBuild { .. } => "descriptor",
            EndpointError::EndpointInitialization { .. } => "injection",
            EndpointError::HandlerInitialization { .. } => "handlers",
            EndpointError::InvalidState { .. } => "state",
        }
    }
}

/// Errors returned to callers of [`EndpointLifecycle::invoke`].
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("no endpoint published as `{0}`")]
    NotPublished(String),

    #[error("endpoint `{port_id}` is {state}, not active")]
    NotActive { port_id: String, state: EndpointState },

    #[error("endpoint `{port_id}` has no operation `{operation}`")]
    UnknownOperation { port_id: String, operation: String },

    #[error("operation `{operation}` on `{port_id}` failed")]
    Failed {
        port_id: String,
        operation: String,
        #[source]
        source: BoxError,
    },
}

/// Teardown step a fault occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownStep {
    HandlerDestroy,
    PreDestroy,
    TransportStop,
}

impl TeardownStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeardownStep::HandlerDestroy => "handler_destroy",
            TeardownStep::PreDestroy => "pre_destroy",
            TeardownStep::TransportStop => "transport_stop",
        }
    }
}

/// A non-fatal teardown failure.
#[derive(Debug)]
pub struct TeardownFault {
    pub step: TeardownStep,
    pub error: BoxError,
}

/// Outcome of [`EndpointLifecycle::stop`].
#[derive(Debug, Default)]
pub struct TeardownReport {
    faults: Vec<TeardownFault>,
}

impl TeardownReport {
    fn record(&mut self, port_id: &str, step: TeardownStep, error: BoxError) {
        tracing::warn!(port_id, step = step.as_str(), error = %error, "Teardown step failed, continuing");
        metrics::record_teardown_fault(step.as_str());
        self.faults.push(TeardownFault { step, error });
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn faults(&self) -> &[TeardownFault] {
        &self.faults
    }
}

/// Collaborators shared by all endpoints of a host.
#[derive(Clone)]
pub struct EndpointEnvironment {
    pub naming: Arc<dyn NamingContext>,
    pub engine: Arc<dyn DescriptionEngine>,
}

/// Admin-facing summary of an endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointSummary {
    pub port_id: String,
    pub class: String,
    pub lifecycle_id: Uuid,
    pub state: EndpointState,
    pub service_name: Option<String>,
    pub port_name: Option<String>,
    pub binding_uri: Option<String>,
    pub operations: Vec<String>,
    pub features: Vec<String>,
}

/// Everything produced by a successful bring-up, committed all at once.
struct Published {
    description: ServiceDescription,
    instance: LiveInstance,
    endpoint_properties: Option<BTreeMap<String, String>>,
    features: Vec<String>,
}

/// One published endpoint, from deployment to teardown.
pub struct EndpointLifecycle {
    lifecycle_id: Uuid,
    class: Arc<ServiceClass>,
    deployment: PortDeployment,
    environment: EndpointEnvironment,
    handlers: Box<dyn HandlerChain>,
    transport: Box<dyn Transport>,
    state: EndpointState,
    published: Option<Published>,
}

impl EndpointLifecycle {
    pub fn new(
        class: Arc<ServiceClass>,
        deployment: PortDeployment,
        environment: EndpointEnvironment,
        handlers: Box<dyn HandlerChain>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            lifecycle_id: Uuid::new_v4(),
            class,
            deployment,
            environment,
            handlers,
            transport,
            state: EndpointState::Deployed,
            published: None,
        }
    }

    pub fn port_id(&self) -> &str {
        &self.deployment.port_id
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn lifecycle_id(&self) -> Uuid {
        self.lifecycle_id
    }

    pub fn state(&self) -> EndpointState {
        self.state
    }

    pub fn description(&self) -> Option<&ServiceDescription> {
        self.published.as_ref().map(|p| &p.description)
    }

    pub fn instance(&self) -> Option<&LiveInstance> {
        self.published.as_ref().map(|p| &p.instance)
    }

    /// Per-class properties resolved at bring-up (explicit mode only).
    pub fn endpoint_properties(&self) -> Option<&BTreeMap<String, String>> {
        self.published.as_ref().and_then(|p| p.endpoint_properties.as_ref())
    }

    pub fn features(&self) -> &[String] {
        self.published.as_ref().map(|p| p.features.as_slice()).unwrap_or(&[])
    }

    /// Bring the endpoint up using `settings`.
    ///
    /// On error nothing is left reachable: the endpoint moves to
    /// [`EndpointState::Failed`] with any injected instance already torn down.
    pub fn start(&mut self, settings: &SettingsSnapshot) -> Result<(), EndpointError> {
        if self.state != EndpointState::Deployed {
            return Err(EndpointError::InvalidState {
                port_id: self.deployment.port_id.clone(),
                state: self.state,
            });
        }

        let span = tracing::info_span!(
            "endpoint",
            port_id = %self.deployment.port_id,
            lifecycle_id = %self.lifecycle_id
        );
        let _guard = span.enter();

        match self.bring_up(settings) {
            Ok(mut published) => {
                published.instance.activate();
                tracing::info!(
                    class = %self.class.name(),
                    service = %published.description.service_name,
                    operations = published.description.operations.len(),
                    "Endpoint active"
                );
                self.published = Some(published);
                self.state = EndpointState::Active;
                metrics::record_start("ok");
                Ok(())
            }
            Err(e) => {
                tracing::error!(class = %self.class.name(), error = %e, "Endpoint bring-up failed");
                self.state = EndpointState::Failed;
                metrics::record_start(e.metric_label());
                Err(e)
            }
        }
    }

    fn bring_up(&mut self, settings: &SettingsSnapshot) -> Result<Published, EndpointError> {
        let port_id = &self.deployment.port_id;

        let explicit = resolver::explicit_mode(settings);
        let feature_view = resolver::resolve_feature_config(explicit, settings);
        let endpoint_properties = resolver::resolve_endpoint_config(explicit, self.class.name(), settings);
        let features = feature_view
            .as_ref()
            .map(|view| resolver::features_for(view, self.class.name()))
            .unwrap_or_default();

        let description = ServiceDescriptorBuilder::new(self.environment.engine.as_ref())
            .build(
                &self.class,
                self.deployment.binding_id.as_deref(),
                self.deployment.configuration_layer(),
            )
            .map_err(|source| EndpointError::DescriptorBuild {
                port_id: port_id.clone(),
                source,
            })?;

        let chain = ResourceResolverChain::for_endpoint(self.environment.naming.resolvers());
        let declared = self.deployment.declared_injections(self.class.injection_points());
        let mut instance = InjectionLifecycle::new(self.environment.naming.as_ref(), &chain)
            .bring_up(&self.class, &declared, &self.deployment.bindings)
            .map_err(|source| EndpointError::EndpointInitialization {
                port_id: port_id.clone(),
                source,
            })?;

        if let Err(source) = self.handlers.initialize() {
            if let Err(fault) = InjectionLifecycle::tear_down(&mut instance) {
                tracing::warn!(error = %fault, "Pre-destroy failed during handler rollback");
            }
            return Err(EndpointError::HandlerInitialization {
                port_id: port_id.clone(),
                source,
            });
        }

        Ok(Published {
            description,
            instance,
            endpoint_properties,
            features,
        })
    }

    /// Tear the endpoint down. A no-op unless the endpoint is active.
    pub fn stop(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        if self.state != EndpointState::Active {
            tracing::debug!(port_id = %self.deployment.port_id, state = %self.state, "Stop ignored");
            return report;
        }
        let port_id = self.deployment.port_id.clone();

        if let Err(e) = self.handlers.destroy() {
            report.record(&port_id, TeardownStep::HandlerDestroy, e);
        }

        if let Some(mut published) = self.published.take() {
            if let Err(e) = InjectionLifecycle::tear_down(&mut published.instance) {
                report.record(&port_id, TeardownStep::PreDestroy, e);
            }
            published.instance.mark_stopped();
        }

        if let Err(e) = self.transport.stop() {
            report.record(&port_id, TeardownStep::TransportStop, e);
        }

        self.state = EndpointState::Stopped;
        metrics::record_stop();
        tracing::info!(port_id = %port_id, faults = report.faults().len(), "Endpoint stopped");
        report
    }

    /// Invoke `operation` on the live instance.
    pub fn invoke(&self, operation: &str, payload: Resource) -> Result<Resource, InvocationError> {
        let port_id = &self.deployment.port_id;
        let published = match (&self.published, self.state) {
            (Some(published), EndpointState::Active) => published,
            _ => {
                return Err(InvocationError::NotActive {
                    port_id: port_id.clone(),
                    state: self.state,
                })
            }
        };

        if published.description.operation(operation).is_none() {
            return Err(InvocationError::UnknownOperation {
                port_id: port_id.clone(),
                operation: operation.to_string(),
            });
        }

        let _scope = InvocationScope::enter(MessageContext::new(port_id.as_str(), operation));
        let result = published.instance.implementation().invoke(operation, payload);
        metrics::record_invocation(port_id, if result.is_ok() { "ok" } else { "error" });

        result.map_err(|source| InvocationError::Failed {
            port_id: port_id.clone(),
            operation: operation.to_string(),
            source,
        })
    }

    pub fn summary(&self) -> EndpointSummary {
        let description = self.description();
        EndpointSummary {
            port_id: self.deployment.port_id.clone(),
            class: self.class.name().to_string(),
            lifecycle_id: self.lifecycle_id,
            state: self.state,
            service_name: description.map(|d| d.service_name.clone()),
            port_name: description.map(|d| d.port_name.clone()),
            binding_uri: description.map(|d| d.binding_uri.clone()),
            operations: description
                .map(|d| d.operations.iter().map(|op| op.name.clone()).collect())
                .unwrap_or_default(),
            features: self.features().to_vec(),
        }
    }
}

impl fmt::Debug for EndpointLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointLifecycle")
            .field("port_id", &self.deployment.port_id)
            .field("class", &self.class.name())
            .field("lifecycle_id", &self.lifecycle_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
