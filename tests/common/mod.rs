//! Shared test doubles for the integration suites.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use endpoint_host::descriptor::ReflectiveEngine;
use endpoint_host::injection::class::{InjectionPoint, OperationInfo, ServiceClass, ServiceImplementation};
use endpoint_host::injection::framework::{FrameworkResource, InvocationContext, ResourceRequest};
use endpoint_host::lifecycle::endpoint::EndpointEnvironment;
use endpoint_host::lifecycle::{HandlerChain, Transport};
use endpoint_host::naming::{InMemoryContext, Resource};
use endpoint_host::BoxError;

/// Ordered record of lifecycle callbacks shared by the doubles of one test.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }
}

/// Failure switches for [`RecordingService`].
#[derive(Clone, Copy, Default)]
pub struct Faults {
    pub post_construct: bool,
    pub pre_destroy: bool,
    pub wants_context: bool,
}

/// Implementation that records every callback and serves back its injections.
pub struct RecordingService {
    log: CallLog,
    faults: Faults,
    values: BTreeMap<String, Resource>,
    context: Option<InvocationContext>,
}

impl ServiceImplementation for RecordingService {
    fn inject(&mut self, point: &str, value: &Resource) -> Result<(), BoxError> {
        self.log.push(format!("inject:{}", point));
        self.values.insert(point.to_string(), value.clone());
        Ok(())
    }

    fn post_construct(&mut self) -> Result<(), BoxError> {
        self.log.push("post_construct");
        if self.faults.post_construct {
            return Err("post-construct refused".into());
        }
        Ok(())
    }

    fn pre_destroy(&mut self) -> Result<(), BoxError> {
        self.log.push("pre_destroy");
        if self.faults.pre_destroy {
            return Err("pre-destroy refused".into());
        }
        Ok(())
    }

    fn framework_requests(&self) -> Vec<ResourceRequest> {
        if self.faults.wants_context {
            vec![ResourceRequest::invocation_context("context")]
        } else {
            Vec::new()
        }
    }

    fn inject_framework(&mut self, request: &ResourceRequest, resource: FrameworkResource) -> Result<(), BoxError> {
        self.log.push(format!("framework:{}", request.name));
        if let FrameworkResource::Invocation(ctx) = resource {
            self.context = Some(ctx);
        }
        Ok(())
    }

    fn invoke(&self, operation: &str, payload: Resource) -> Result<Resource, BoxError> {
        match operation {
            "values" => Ok(json!(self.values)),
            "current" => Ok(json!({
                "operation": self.context.as_ref().and_then(|c| c.operation()),
                "port_id": self.context.as_ref().and_then(|c| c.message_context()).map(|m| m.port_id),
            })),
            "fail" => Err(format!("cannot handle {}", payload).into()),
            other => Err(format!("unexpected operation {}", other).into()),
        }
    }
}

/// A class whose instances are [`RecordingService`]s.
pub fn recording_class(name: &str, points: &[&str], log: &CallLog, faults: Faults) -> ServiceClass {
    let factory_log = log.clone();
    let mut class = ServiceClass::new(name, move || {
        factory_log.push("instantiate");
        Ok(Box::new(RecordingService {
            log: factory_log.clone(),
            faults,
            values: BTreeMap::new(),
            context: None,
        }) as Box<dyn ServiceImplementation>)
    })
    .with_operation(OperationInfo::new("values"))
    .with_operation(OperationInfo::new("current"))
    .with_operation(OperationInfo::new("fail"));
    for point in points {
        class = class.with_injection(InjectionPoint::new(*point));
    }
    class
}

/// Handler chain double.
pub struct RecordingHandlers {
    pub log: CallLog,
    pub fail_initialize: bool,
    pub fail_destroy: bool,
}

impl RecordingHandlers {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_initialize: false,
            fail_destroy: false,
        }
    }
}

impl HandlerChain for RecordingHandlers {
    fn initialize(&mut self) -> Result<(), BoxError> {
        self.log.push("handlers_initialize");
        if self.fail_initialize {
            return Err("handler rejected configuration".into());
        }
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), BoxError> {
        self.log.push("handlers_destroy");
        if self.fail_destroy {
            return Err("handler destroy failed".into());
        }
        Ok(())
    }
}

/// Transport double.
pub struct RecordingTransport {
    pub log: CallLog,
    pub fail_stop: bool,
}

impl RecordingTransport {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_stop: false,
        }
    }
}

impl Transport for RecordingTransport {
    fn stop(&mut self) -> Result<(), BoxError> {
        self.log.push("transport_stop");
        if self.fail_stop {
            return Err("socket already closed".into());
        }
        Ok(())
    }
}

/// Environment over `naming` with the reflective description engine.
pub fn environment(naming: InMemoryContext) -> EndpointEnvironment {
    EndpointEnvironment {
        naming: Arc::new(naming),
        engine: Arc::new(ReflectiveEngine),
    }
}
