//! Live implementation instances.

use std::fmt;

use serde::Serialize;

use crate::injection::class::ServiceImplementation;
use crate::injection::plan::InjectionPlan;

/// Lifecycle state of a [`LiveInstance`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Created,
    Injected,
    PostConstructed,
    Active,
    PreDestroyed,
    Stopped,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Created => "created",
            InstanceState::Injected => "injected",
            InstanceState::PostConstructed => "post_constructed",
            InstanceState::Active => "active",
            InstanceState::PreDestroyed => "pre_destroyed",
            InstanceState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// An instantiated implementation together with the plan that wired it.
pub struct LiveInstance {
    class_name: String,
    implementation: Box<dyn ServiceImplementation>,
    plan: InjectionPlan,
    state: InstanceState,
}

impl LiveInstance {
    pub(crate) fn new(class_name: impl Into<String>, implementation: Box<dyn ServiceImplementation>) -> Self {
        Self {
            class_name: class_name.into(),
            implementation,
            plan: InjectionPlan::default(),
            state: InstanceState::Created,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn plan(&self) -> &InjectionPlan {
        &self.plan
    }

    pub fn implementation(&self) -> &dyn ServiceImplementation {
        self.implementation.as_ref()
    }

    pub(crate) fn implementation_mut(&mut self) -> &mut dyn ServiceImplementation {
        self.implementation.as_mut()
    }

    pub(crate) fn set_plan(&mut self, plan: InjectionPlan) {
        self.plan = plan;
    }

    /// Move to `next`. Backwards or repeated transitions are ignored.
    pub(crate) fn advance(&mut self, next: InstanceState) -> bool {
        if next <= self.state {
            tracing::warn!(class = %self.class_name, from = %self.state, to = %next, "Ignoring non-forward instance transition");
            return false;
        }
        tracing::trace!(class = %self.class_name, from = %self.state, to = %next, "Instance transition");
        self.state = next;
        true
    }

    /// Mark the instance ready for invocation.
    pub(crate) fn activate(&mut self) {
        self.advance(InstanceState::Active);
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.advance(InstanceState::Stopped);
    }
}

impl fmt::Debug for LiveInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveInstance")
            .field("class_name", &self.class_name)
            .field("plan", &self.plan)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
