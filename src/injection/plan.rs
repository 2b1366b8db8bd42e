//! Application-level injection plan.
//!
//! # Responsibilities
//! - Map every declared injection point to exactly one resource
//! - Prefer explicit binding overrides over naming lookups
//!
//! # Design Decisions
//! - Overrides match on the point name first, then on its lookup key
//! - Resolution is all-or-nothing: the first unresolvable point fails the plan
//! - Nothing is applied to the instance here; the plan is data

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::injection::class::InjectionPoint;
use crate::injection::error::InjectionError;
use crate::naming::{Binding, NamingContext, Resource};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Override,
    Naming,
}

/// One resolved injection point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInjection {
    pub point: InjectionPoint,
    pub value: Resource,
    pub source: ResolutionSource,
}

/// Resolved values for all declared injection points, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionPlan {
    entries: Vec<ResolvedInjection>,
}

impl InjectionPlan {
    /// Resolve `declared` against `overrides`, falling back to `naming`.
    pub fn resolve(
        declared: &[InjectionPoint],
        overrides: &BTreeMap<String, Resource>,
        naming: &dyn NamingContext,
    ) -> Result<Self, InjectionError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(declared.len());

        for point in declared {
            if !seen.insert(point.name.as_str()) {
                return Err(InjectionError::DuplicatePoint {
                    point: point.name.clone(),
                });
            }

            let key = point.lookup_key();
            let overridden = overrides.get(&point.name).or_else(|| overrides.get(&key));
            let (value, source) = match overridden {
                Some(value) => (value.clone(), ResolutionSource::Override),
                None => match naming.lookup(&key) {
                    Ok(Binding::Resource(value)) => (value, ResolutionSource::Naming),
                    Ok(Binding::Context(_)) => {
                        return Err(InjectionError::NotAResource {
                            point: point.name.clone(),
                            key,
                        })
                    }
                    Err(source) => {
                        return Err(InjectionError::Unresolved {
                            point: point.name.clone(),
                            key,
                            source,
                        })
                    }
                },
            };

            tracing::debug!(point = %point.name, source = ?source, "Injection point resolved");
            entries.push(ResolvedInjection {
                point: point.clone(),
                value,
                source,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ResolvedInjection] {
        &self.entries
    }

    pub fn get(&self, point: &str) -> Option<&Resource> {
        self.entries
            .iter()
            .find(|e| e.point.name == point)
            .map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
