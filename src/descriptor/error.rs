//! Descriptor build failures.

use thiserror::Error;

use crate::BoxError;

/// Errors raised while building a service description. Never retried.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("malformed binding id `{binding_id}`")]
    MalformedBinding { binding_id: String },

    #[error("description engine could not describe {class}")]
    Engine {
        class: String,
        #[source]
        source: BoxError,
    },
}
