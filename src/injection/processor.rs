//! Bring-up and teardown of implementation instances.
//!
//! # Bring-up
//! ```text
//! instantiate (no args)              → Created
//!     → resolve plan + apply         → Injected
//!     → post_construct               → PostConstructed
//!     → framework injection (chain)  (instance returned; caller activates)
//! ```
//!
//! Each step runs only if the previous one succeeded. A failure before
//! post-construct drops the instance without callbacks; a framework injection
//! failure after post-construct runs pre-destroy before the error surfaces.

use std::collections::BTreeMap;

use crate::injection::class::{InjectionPoint, ServiceClass};
use crate::injection::error::InjectionError;
use crate::injection::framework::ResourceResolverChain;
use crate::injection::instance::{InstanceState, LiveInstance};
use crate::injection::plan::InjectionPlan;
use crate::naming::{NamingContext, Resource};
use crate::BoxError;

/// Runs the two injection passes for one endpoint.
pub struct InjectionLifecycle<'a> {
    naming: &'a dyn NamingContext,
    chain: &'a ResourceResolverChain,
}

impl<'a> InjectionLifecycle<'a> {
    pub fn new(naming: &'a dyn NamingContext, chain: &'a ResourceResolverChain) -> Self {
        Self { naming, chain }
    }

    /// Instantiate `class`, inject `declared` points and run post-construct.
    pub fn bring_up(
        &self,
        class: &ServiceClass,
        declared: &[InjectionPoint],
        overrides: &BTreeMap<String, Resource>,
    ) -> Result<LiveInstance, InjectionError> {
        let implementation = class
            .instantiate()
            .map_err(|source| InjectionError::Instantiation {
                class: class.name().to_string(),
                source,
            })?;
        let mut instance = LiveInstance::new(class.name(), implementation);

        let plan = InjectionPlan::resolve(declared, overrides, self.naming)?;
        for entry in plan.entries() {
            instance
                .implementation_mut()
                .inject(&entry.point.name, &entry.value)
                .map_err(|source| InjectionError::Rejected {
                    point: entry.point.name.clone(),
                    source,
                })?;
        }
        instance.set_plan(plan);
        instance.advance(InstanceState::Injected);

        instance
            .implementation_mut()
            .post_construct()
            .map_err(InjectionError::PostConstruct)?;
        instance.advance(InstanceState::PostConstructed);

        if let Err(e) = self.inject_framework(&mut instance) {
            if let Err(fault) = Self::tear_down(&mut instance) {
                tracing::warn!(class = %class.name(), error = %fault, "Pre-destroy failed while discarding instance");
            }
            return Err(e);
        }

        tracing::debug!(
            class = %class.name(),
            injected = instance.plan().len(),
            "Implementation brought up"
        );
        Ok(instance)
    }

    /// Framework pass: resolve every requested resource through the chain only.
    fn inject_framework(&self, instance: &mut LiveInstance) -> Result<(), InjectionError> {
        let requests = instance.implementation().framework_requests();
        for request in requests {
            let resource = self.chain.resolve(&request).ok_or_else(|| {
                InjectionError::UnresolvedFrameworkResource {
                    name: request.name.clone(),
                }
            })?;
            instance
                .implementation_mut()
                .inject_framework(&request, resource)
                .map_err(|source| InjectionError::FrameworkRejected {
                    name: request.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Run pre-destroy once.
    ///
    /// A no-op for instances that never completed post-construct or were
    /// already torn down. The instance counts as torn down even if the
    /// callback fails.
    pub fn tear_down(instance: &mut LiveInstance) -> Result<(), BoxError> {
        let state = instance.state();
        if state < InstanceState::PostConstructed || state >= InstanceState::PreDestroyed {
            return Ok(());
        }

        let result = instance.implementation_mut().pre_destroy();
        instance.advance(InstanceState::PreDestroyed);
        result
    }
}
