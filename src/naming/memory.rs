//! In-process naming tree.
//!
//! Built once at host startup (from the `[naming]` config table or by hand in
//! tests), then frozen behind an `Arc`. Binding after sharing is not supported.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::injection::framework::ResourceResolver;
use crate::naming::{segments, Binding, BindingKind, NameClassPair, NamingContext, NamingError, Resource};

#[derive(Clone)]
enum Node {
    Resource(Resource),
    Context(Arc<InMemoryContext>),
}

/// A naming context backed by nested ordered maps.
#[derive(Clone, Default)]
pub struct InMemoryContext {
    entries: BTreeMap<String, Node>,
    resolvers: Vec<Arc<dyn ResourceResolver>>,
}

impl InMemoryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a JSON value: objects become sub-contexts, everything else a resource.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut ctx = Self::new();
        if let serde_json::Value::Object(map) = value {
            for (name, child) in map {
                let node = match child {
                    serde_json::Value::Object(_) => Node::Context(Arc::new(Self::from_json(child))),
                    other => Node::Resource(other.clone()),
                };
                ctx.entries.insert(name.clone(), node);
            }
        }
        ctx
    }

    /// Build a tree from a TOML table (see [`InMemoryContext::from_json`]).
    pub fn from_toml(table: &toml::Table) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_value(table)?;
        Ok(Self::from_json(&json))
    }

    /// Bind a resource at `name`, creating intermediate contexts.
    pub fn bind(&mut self, name: &str, value: impl Into<Resource>) -> Result<(), NamingError> {
        let parts: Vec<&str> = segments(name).collect();
        let Some((leaf, parents)) = parts.split_last() else {
            return Err(NamingError::InvalidName(name.to_string()));
        };

        let mut ctx = self;
        for part in parents {
            let node = ctx
                .entries
                .entry(part.to_string())
                .or_insert_with(|| Node::Context(Arc::new(InMemoryContext::new())));
            ctx = match node {
                Node::Context(child) => Arc::make_mut(child),
                Node::Resource(_) => return Err(NamingError::NotAContext(part.to_string())),
            };
        }
        ctx.entries.insert(leaf.to_string(), Node::Resource(value.into()));
        Ok(())
    }

    /// Add a framework resource resolver offered to endpoints.
    pub fn with_resolver(mut self, resolver: Arc<dyn ResourceResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    fn find(&self, name: &str) -> Result<Option<&Node>, NamingError> {
        let mut parts = segments(name).peekable();
        if parts.peek().is_none() {
            return Ok(None);
        }

        let mut ctx = self;
        while let Some(part) = parts.next() {
            let node = ctx
                .entries
                .get(part)
                .ok_or_else(|| NamingError::NotFound(name.to_string()))?;
            if parts.peek().is_none() {
                return Ok(Some(node));
            }
            ctx = match node {
                Node::Context(child) => child,
                Node::Resource(_) => return Err(NamingError::NotAContext(part.to_string())),
            };
        }
        Ok(None)
    }
}

impl NamingContext for InMemoryContext {
    fn lookup(&self, name: &str) -> Result<Binding, NamingError> {
        match self.find(name)? {
            Some(Node::Resource(value)) => Ok(Binding::Resource(value.clone())),
            Some(Node::Context(child)) => Ok(Binding::Context(child.clone())),
            None => Err(NamingError::InvalidName(name.to_string())),
        }
    }

    fn list(&self, name: &str) -> Result<Vec<NameClassPair>, NamingError> {
        let ctx = match self.find(name)? {
            None => self,
            Some(Node::Context(child)) => child.as_ref(),
            Some(Node::Resource(_)) => return Err(NamingError::NotAContext(name.to_string())),
        };

        Ok(ctx
            .entries
            .iter()
            .map(|(name, node)| NameClassPair {
                name: name.clone(),
                kind: match node {
                    Node::Resource(_) => BindingKind::Resource,
                    Node::Context(_) => BindingKind::Context,
                },
            })
            .collect())
    }

    fn resolvers(&self) -> Vec<Arc<dyn ResourceResolver>> {
        self.resolvers.clone()
    }
}
