//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → registry.rs publish per endpoint (concurrent)
//!         → endpoint.rs start: descriptor → injection → handlers → Active
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop background tasks → registry stop_all
//!         → endpoint.rs stop: handlers destroy → pre-destroy → transport stop
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered bring-up: descriptor first, then injection, then handlers
//! - Ordered teardown: handlers, instance, transport
//! - Bring-up failures roll back; teardown failures are collected, never thrown
//! - `stop` is idempotent

pub mod endpoint;
pub mod handlers;
pub mod registry;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod transport;

pub use endpoint::{
    EndpointEnvironment, EndpointError, EndpointLifecycle, EndpointState, InvocationError, TeardownReport,
    TeardownStep,
};
pub use handlers::HandlerChain;
pub use registry::{EndpointRegistry, PublishError};
pub use shutdown::Shutdown;
pub use transport::Transport;
