//! Implementation classes bundled with the host.

pub mod echo;

use crate::injection::ClassRegistry;

/// Register every bundled class.
pub fn register_builtin(registry: &mut ClassRegistry) {
    registry.register(echo::class());
}
