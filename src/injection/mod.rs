//! Dependency injection subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceClass (factory + declared points)
//!     → processor.rs: instantiate
//!     → plan.rs: overrides ▸ naming lookup → InjectionPlan → applied
//!     → post_construct
//!     → framework.rs: ResourceResolverChain → framework resources applied
//!     → LiveInstance (instance.rs)
//!
//! Teardown:
//!     processor.rs → pre_destroy (at most once)
//! ```
//!
//! # Design Decisions
//! - Application injection and framework injection are separate passes
//! - Binding overrides only ever apply to the application pass
//! - Every declared point must resolve, or nothing is returned

pub mod class;
pub mod error;
pub mod framework;
pub mod instance;
pub mod plan;
pub mod processor;

pub use class::{ClassRegistry, InjectionPoint, OperationInfo, ServiceClass, ServiceImplementation};
pub use error::InjectionError;
pub use framework::{InvocationContext, ResourceRequest, ResourceResolver, ResourceResolverChain};
pub use instance::{InstanceState, LiveInstance};
pub use plan::InjectionPlan;
pub use processor::InjectionLifecycle;
