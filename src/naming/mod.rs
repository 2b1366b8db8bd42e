//! Naming context subsystem.
//!
//! # Data Flow
//! ```text
//! Host config [naming] table
//!     → memory.rs (InMemoryContext tree)
//!     → shared via Arc<dyn NamingContext>
//!
//! Consumers:
//!     → injection (lookup of declared injection points)
//!     → injection::framework (resolvers() seeds the resolver chain)
//!     → listing.rs (flatten the tree for the admin API)
//! ```
//!
//! # Design Decisions
//! - Names are `/`-separated paths relative to the context they are looked up in
//! - Sub-contexts are bindings like any other, so walkers can recurse
//! - The directory service itself is a collaborator; only the in-memory tree ships here

pub mod listing;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::injection::framework::ResourceResolver;

pub use memory::InMemoryContext;

/// A value bound in a naming context or supplied as an explicit binding override.
pub type Resource = serde_json::Value;

/// What a name resolves to.
#[derive(Clone)]
pub enum Binding {
    Resource(Resource),
    Context(Arc<dyn NamingContext>),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Resource(value) => f.debug_tuple("Resource").field(value).finish(),
            Binding::Context(_) => f.write_str("Context(..)"),
        }
    }
}

/// Kind of a listed binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Resource,
    Context,
}

/// One entry produced by [`NamingContext::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameClassPair {
    pub name: String,
    pub kind: BindingKind,
}

/// Errors raised by naming operations.
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("name not found: {0}")]
    NotFound(String),

    #[error("not a context: {0}")]
    NotAContext(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

/// Directory collaborator used for resource lookup.
pub trait NamingContext: Send + Sync {
    /// Resolve a name relative to this context.
    fn lookup(&self, name: &str) -> Result<Binding, NamingError>;

    /// List the direct children of the named sub-context (`""` lists this context).
    fn list(&self, name: &str) -> Result<Vec<NameClassPair>, NamingError>;

    /// Resolvers contributed to framework-level resource injection.
    fn resolvers(&self) -> Vec<Arc<dyn ResourceResolver>> {
        Vec::new()
    }
}

/// Split a name into its non-empty path segments.
pub(crate) fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('/').filter(|s| !s.is_empty())
}
