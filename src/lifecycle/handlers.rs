//! Handler chain collaborator.
//!
//! # Design Decisions
//! - `initialize` failures are fatal to bring-up
//! - `destroy` failures are reported, never fatal to teardown

use crate::BoxError;

/// Handler chain attached to one endpoint.
pub trait HandlerChain: Send + Sync {
    fn initialize(&mut self) -> Result<(), BoxError>;

    fn destroy(&mut self) -> Result<(), BoxError>;
}

/// Handler chain built from the handler names in a deployment.
///
/// Handlers carry no behaviour of their own here; the chain tracks their
/// lifecycle and logs it.
#[derive(Debug, Default)]
pub struct ConfiguredHandlerChain {
    port_id: String,
    handlers: Vec<String>,
    initialized: usize,
}

impl ConfiguredHandlerChain {
    pub fn new(port_id: impl Into<String>, handlers: Vec<String>) -> Self {
        Self {
            port_id: port_id.into(),
            handlers,
            initialized: 0,
        }
    }

    pub fn handlers(&self) -> &[String] {
        &self.handlers
    }

    pub fn initialized(&self) -> usize {
        self.initialized
    }
}

impl HandlerChain for ConfiguredHandlerChain {
    fn initialize(&mut self) -> Result<(), BoxError> {
        self.initialized = 0;
        for handler in &self.handlers {
            if handler.trim().is_empty() {
                return Err(format!("handler #{} of {} has no name", self.initialized, self.port_id).into());
            }
            tracing::debug!(port_id = %self.port_id, handler = %handler, "Handler initialized");
            self.initialized += 1;
        }
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), BoxError> {
        // Reverse order of initialization.
        for handler in self.handlers[..self.initialized].iter().rev() {
            tracing::debug!(port_id = %self.port_id, handler = %handler, "Handler destroyed");
        }
        self.initialized = 0;
        Ok(())
    }
}
