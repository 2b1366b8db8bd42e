//! Flat listing of a naming tree.
//!
//! # Responsibilities
//! - Walk a context depth-first from a root name
//! - Emit one entry per leaf resource, keyed by its full path
//!
//! # Design Decisions
//! - A root that cannot be listed contributes nothing (not an error)
//! - Entries whose lookup fails are skipped
//! - Leaf values are rendered through their display form

use serde::Serialize;

use crate::naming::{Binding, NamingContext};

/// One leaf of a naming tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingEntry {
    pub module: String,
    pub name: String,
    pub value: String,
}

/// Append every leaf under `root` to `out`.
pub fn mount(out: &mut Vec<NamingEntry>, ctx: &dyn NamingContext, module: &str, root: &str) {
    let pairs = match ctx.list(root) {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::debug!(module, root, error = %e, "Naming root not listable, skipping");
            return;
        }
    };

    for pair in pairs {
        let key = format!("{}/{}", root, pair.name);
        let binding = match ctx.lookup(&key) {
            Ok(binding) => binding,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Naming entry vanished during listing");
                continue;
            }
        };

        match binding {
            // Relative to the child, so the walk restarts at its root.
            Binding::Context(child) => mount_prefixed(out, child.as_ref(), module, &key),
            Binding::Resource(value) => out.push(NamingEntry {
                module: module.to_string(),
                name: key,
                value: display(&value),
            }),
        }
    }
}

/// List several roots of the same context under one module id.
pub fn list_roots(ctx: &dyn NamingContext, module: &str, roots: &[&str]) -> Vec<NamingEntry> {
    let mut out = Vec::new();
    for root in roots {
        mount(&mut out, ctx, module, root);
    }
    out
}

fn mount_prefixed(out: &mut Vec<NamingEntry>, ctx: &dyn NamingContext, module: &str, prefix: &str) {
    let start = out.len();
    mount(out, ctx, module, "");
    for entry in &mut out[start..] {
        entry.name = format!("{}{}", prefix, entry.name);
    }
}

fn display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
