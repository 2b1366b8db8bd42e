//! Transport collaborator.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::BoxError;

/// The transport an endpoint is published on. Only stopping is driven from here.
pub trait Transport: Send + Sync {
    /// Stop serving. Must be idempotent and harmless if never started.
    fn stop(&mut self) -> Result<(), BoxError>;
}

/// In-process transport: invocations go straight through the registry.
#[derive(Debug, Default)]
pub struct LocalTransport {
    port_id: String,
    stopped: AtomicBool,
}

impl LocalTransport {
    pub fn new(port_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

impl Transport for LocalTransport {
    fn stop(&mut self) -> Result<(), BoxError> {
        if !self.stopped.swap(true, Ordering::Relaxed) {
            tracing::debug!(port_id = %self.port_id, "Transport stopped");
        }
        Ok(())
    }
}
