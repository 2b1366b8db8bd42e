//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HostConfig (validated, immutable)
//!         [settings] → settings.rs (SettingsSnapshot in a SettingsStore)
//!         [naming]   → naming::InMemoryContext
//!         [[endpoints]] → PortDeployment per endpoint
//!
//! Per endpoint bring-up:
//!     SettingsStore::snapshot()
//!     → resolver.rs (feature view / per-class properties)
//!
//! On file change:
//!     watcher.rs (SettingsWatcher) detects change
//!     → loader.rs loads new config
//!     → SettingsStore::replace (atomic swap of the settings snapshot)
//!     → next bring-up observes the new settings
//! ```
//!
//! # Design Decisions
//! - Settings are immutable snapshots; changes require a swap
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Endpoints already running keep the settings they started with

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod validation;
pub mod watcher;

pub use schema::HostConfig;
pub use schema::PortDeployment;
pub use settings::{SettingsSnapshot, SettingsStore};
pub use resolver::ConfigurationView;
pub use watcher::SettingsWatcher;
