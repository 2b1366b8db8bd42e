//! Echo service.
//!
//! Returns its payload prefixed with an injected greeting. Useful for smoke
//! testing a deployment: it exercises application injection (`greeting`),
//! framework injection (the invocation context) and both callbacks.

use serde_json::json;

use crate::injection::class::{InjectionPoint, OperationInfo, ServiceClass, ServiceImplementation};
use crate::injection::framework::{FrameworkResource, InvocationContext, ResourceKind, ResourceRequest};
use crate::naming::Resource;
use crate::BoxError;

pub const CLASS_NAME: &str = "builtin.EchoService";

pub fn class() -> ServiceClass {
    ServiceClass::new(CLASS_NAME, || Ok(Box::new(EchoService::default()) as Box<dyn ServiceImplementation>))
        .with_operation(OperationInfo::new("echo"))
        .with_operation(OperationInfo::new("whoami"))
        .with_injection(InjectionPoint::new("greeting"))
}

#[derive(Default)]
pub struct EchoService {
    greeting: Option<String>,
    context: Option<InvocationContext>,
    ready: bool,
}

impl ServiceImplementation for EchoService {
    fn inject(&mut self, point: &str, value: &Resource) -> Result<(), BoxError> {
        match point {
            "greeting" => {
                let greeting = value
                    .as_str()
                    .ok_or_else(|| format!("greeting must be a string, got {}", value))?;
                self.greeting = Some(greeting.to_string());
                Ok(())
            }
            other => Err(format!("unknown injection point `{}`", other).into()),
        }
    }

    fn post_construct(&mut self) -> Result<(), BoxError> {
        if self.greeting.as_deref().map_or(true, str::is_empty) {
            return Err("greeting is empty".into());
        }
        self.ready = true;
        Ok(())
    }

    fn pre_destroy(&mut self) -> Result<(), BoxError> {
        self.ready = false;
        Ok(())
    }

    fn framework_requests(&self) -> Vec<ResourceRequest> {
        vec![ResourceRequest::invocation_context("context")]
    }

    fn inject_framework(&mut self, request: &ResourceRequest, resource: FrameworkResource) -> Result<(), BoxError> {
        match (request.kind, resource) {
            (ResourceKind::InvocationContext, FrameworkResource::Invocation(ctx)) => {
                self.context = Some(ctx);
                Ok(())
            }
            (_, other) => Err(format!("unexpected framework resource {:?}", other).into()),
        }
    }

    fn invoke(&self, operation: &str, payload: Resource) -> Result<Resource, BoxError> {
        if !self.ready {
            return Err("service is not ready".into());
        }
        match operation {
            "echo" => Ok(json!({
                "greeting": self.greeting,
                "payload": payload,
            })),
            "whoami" => {
                let message = self.context.as_ref().and_then(|ctx| ctx.message_context());
                Ok(json!({
                    "port_id": message.as_ref().map(|m| m.port_id.clone()),
                    "operation": message.map(|m| m.operation),
                }))
            }
            other => Err(format!("unsupported operation `{}`", other).into()),
        }
    }
}
