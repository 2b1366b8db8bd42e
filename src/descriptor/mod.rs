//! Service description subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceClass annotations → Reflected layer ─┐
//! PortDeployment metadata  → Override layer  ─┼→ ServiceConfigurations
//!                                             │
//! binding id → binding.rs → binding URI ──────┴→ DescriptionEngine → ServiceDescription
//! ```
//!
//! # Design Decisions
//! - Override precedence is modelled with explicit priorities (configuration.rs)
//! - A missing binding id is legal; the engine infers SOAP 1.1 over HTTP
//! - Build errors are fatal and never retried

pub mod binding;
pub mod builder;
pub mod configuration;
pub mod error;

pub use builder::{DescriptionEngine, ReflectiveEngine, ServiceDescription, ServiceDescriptorBuilder};
pub use configuration::{ConfigKey, ConfigurationLayer, LayerPriority, ServiceConfigurations};
pub use error::DescriptorError;
