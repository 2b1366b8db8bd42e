//! Framework-context resource injection.
//!
//! # Responsibilities
//! - Describe framework resources an implementation asks for
//! - Resolve them through an ordered resolver chain
//! - Expose the per-invocation context to implementations
//!
//! # Design Decisions
//! - Separate from application injection: binding overrides never apply here
//! - First resolver that answers wins
//! - The chain is appended to while owned, then frozen behind an Arc
//! - The current invocation lives in a thread-local, set by the invoker

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::naming::Resource;

/// Kind of framework resource requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Handle onto the invocation currently being served.
    InvocationContext,
    /// A named value supplied by a host-provided resolver.
    Named,
}

/// A framework resource an implementation wants injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceRequest {
    pub fn invocation_context(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::InvocationContext,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::Named,
        }
    }
}

/// A resolved framework resource.
#[derive(Debug, Clone)]
pub enum FrameworkResource {
    Invocation(InvocationContext),
    Value(Resource),
}

/// One link of the framework resolver chain.
pub trait ResourceResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Answer the request, or `None` to let the next resolver try.
    fn resolve(&self, request: &ResourceRequest) -> Option<FrameworkResource>;
}

/// Ordered set of resolvers consulted for framework injection.
#[derive(Clone, Default)]
pub struct ResourceResolverChain {
    resolvers: Vec<Arc<dyn ResourceResolver>>,
}

impl ResourceResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn ResourceResolver>>) -> Self {
        Self { resolvers }
    }

    /// The chain every endpoint uses: host-provided resolvers, then the invocation context.
    pub fn for_endpoint(base: Vec<Arc<dyn ResourceResolver>>) -> Self {
        let mut chain = Self::new(base);
        chain.push(Arc::new(InvocationContextResolver));
        chain
    }

    /// Append a resolver. Only possible before the chain is shared.
    pub fn push(&mut self, resolver: Arc<dyn ResourceResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn resolve(&self, request: &ResourceRequest) -> Option<FrameworkResource> {
        self.resolvers.iter().find_map(|resolver| {
            let found = resolver.resolve(request);
            if found.is_some() {
                tracing::trace!(resolver = resolver.name(), resource = %request.name, "Framework resource resolved");
            }
            found
        })
    }
}

impl fmt::Debug for ResourceResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}

/// Supplies [`InvocationContext`] handles.
#[derive(Debug, Default)]
pub struct InvocationContextResolver;

impl ResourceResolver for InvocationContextResolver {
    fn name(&self) -> &str {
        "invocation-context"
    }

    fn resolve(&self, request: &ResourceRequest) -> Option<FrameworkResource> {
        match request.kind {
            ResourceKind::InvocationContext => Some(FrameworkResource::Invocation(InvocationContext)),
            ResourceKind::Named => None,
        }
    }
}

/// Resolves [`ResourceKind::Named`] requests from a fixed map.
#[derive(Debug, Default)]
pub struct StaticResolver {
    name: String,
    values: BTreeMap<String, Resource>,
}

impl StaticResolver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Resource>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ResourceResolver for StaticResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, request: &ResourceRequest) -> Option<FrameworkResource> {
        match request.kind {
            ResourceKind::Named => self.values.get(&request.name).cloned().map(FrameworkResource::Value),
            ResourceKind::InvocationContext => None,
        }
    }
}

/// State of one in-flight invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContext {
    pub port_id: String,
    pub operation: String,
    pub properties: BTreeMap<String, Resource>,
}

impl MessageContext {
    pub fn new(port_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            operation: operation.into(),
            properties: BTreeMap::new(),
        }
    }
}

thread_local! {
    static CURRENT: RefCell<Option<MessageContext>> = const { RefCell::new(None) };
}

/// Handle onto the invocation being served on the current thread.
///
/// Holding one outside an invocation is fine; it simply reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvocationContext;

impl InvocationContext {
    /// Snapshot of the current message context, if an invocation is in progress.
    pub fn message_context(&self) -> Option<MessageContext> {
        CURRENT.with(|current| current.borrow().clone())
    }

    pub fn operation(&self) -> Option<String> {
        CURRENT.with(|current| current.borrow().as_ref().map(|m| m.operation.clone()))
    }
}

/// Installs a message context for the duration of an invocation.
///
/// Restores the previous context on drop, so nested invocations unwind correctly.
#[must_use]
pub struct InvocationScope {
    previous: Option<MessageContext>,
}

impl InvocationScope {
    pub fn enter(context: MessageContext) -> Self {
        let previous = CURRENT.with(|current| current.replace(Some(context)));
        Self { previous }
    }
}

impl Drop for InvocationScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}
