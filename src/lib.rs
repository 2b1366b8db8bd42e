//! Service endpoint host library.
//!
//! Publishes service implementation classes as endpoints: builds their
//! service description, brings the implementation instance up through
//! application and framework injection, and tears everything down in order.

pub mod admin;
pub mod config;
pub mod descriptor;
pub mod injection;
pub mod lifecycle;
pub mod naming;
pub mod observability;
pub mod services;

/// Error type of user-supplied callbacks and collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use config::schema::HostConfig;
pub use config::settings::{SettingsSnapshot, SettingsStore};
pub use injection::{ClassRegistry, ServiceClass, ServiceImplementation};
pub use lifecycle::{EndpointLifecycle, EndpointRegistry, Shutdown};
