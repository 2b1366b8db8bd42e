//! Injection failures.

use thiserror::Error;

use crate::naming::NamingError;
use crate::BoxError;

/// Errors raised while bringing an implementation up.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("failed to instantiate {class}")]
    Instantiation {
        class: String,
        #[source]
        source: BoxError,
    },

    #[error("injection point `{point}` declared more than once")]
    DuplicatePoint { point: String },

    #[error("injection point `{point}` could not be resolved via `{key}`")]
    Unresolved {
        point: String,
        key: String,
        #[source]
        source: NamingError,
    },

    #[error("injection point `{point}` resolved to a naming context at `{key}`, not a resource")]
    NotAResource { point: String, key: String },

    #[error("implementation rejected injection `{point}`")]
    Rejected {
        point: String,
        #[source]
        source: BoxError,
    },

    #[error("post-construct callback failed")]
    PostConstruct(#[source] BoxError),

    #[error("no resolver supplied framework resource `{name}`")]
    UnresolvedFrameworkResource { name: String },

    #[error("implementation rejected framework resource `{name}`")]
    FrameworkRejected {
        name: String,
        #[source]
        source: BoxError,
    },
}
