//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint identity (non-empty, unique port ids)
//! - Check injection declarations are unambiguous
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HostConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::HostConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoint #{index} has an empty port_id")]
    EmptyPortId { index: usize },

    #[error("endpoint `{port_id}` has an empty class")]
    EmptyClass { port_id: String },

    #[error("port_id `{port_id}` is used more than once")]
    DuplicatePortId { port_id: String },

    #[error("endpoint `{port_id}` declares injection `{name}` more than once")]
    DuplicateInjection { port_id: String, name: String },

    #[error("admin api_key must not be empty when admin is enabled")]
    EmptyAdminKey,
}

pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut port_ids = HashSet::new();

    for (index, port) in config.endpoints.iter().enumerate() {
        if port.port_id.trim().is_empty() {
            errors.push(ValidationError::EmptyPortId { index });
        } else if !port_ids.insert(port.port_id.as_str()) {
            errors.push(ValidationError::DuplicatePortId {
                port_id: port.port_id.clone(),
            });
        }

        if port.class.trim().is_empty() {
            errors.push(ValidationError::EmptyClass {
                port_id: port.port_id.clone(),
            });
        }

        let mut names = HashSet::new();
        for point in &port.injections {
            if !names.insert(point.name.as_str()) {
                errors.push(ValidationError::DuplicateInjection {
                    port_id: port.port_id.clone(),
                    name: point.name.clone(),
                });
            }
        }
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::EmptyAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
