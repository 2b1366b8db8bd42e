//! Settings reload on configuration file change.
//!
//! # Design Decisions
//! - Only `[settings]` is reloaded; endpoints, naming and admin need a restart
//! - A file that fails to load or validate leaves the current snapshot in place
//! - Running endpoints keep the snapshot they started with

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::{load_config, ConfigError};
use crate::config::settings::{SettingsSnapshot, SettingsStore};

/// Swaps the settings snapshot of a [`SettingsStore`] whenever the file changes.
pub struct SettingsWatcher {
    path: PathBuf,
    store: Arc<SettingsStore>,
}

impl SettingsWatcher {
    pub fn new(path: impl Into<PathBuf>, store: Arc<SettingsStore>) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file and install its settings as the current snapshot.
    pub fn reload(&self) -> Result<Arc<SettingsSnapshot>, ConfigError> {
        let config = load_config(&self.path)?;
        self.store.replace(config.settings_snapshot());
        Ok(self.store.snapshot())
    }

    /// Start watching on notify's background thread.
    ///
    /// Reloading stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => match self.reload() {
                    Ok(snapshot) => {
                        tracing::debug!(path = ?self.path, entries = snapshot.len(), "Settings reloaded")
                    }
                    Err(e) => {
                        tracing::error!(path = ?self.path, error = %e, "Settings reload failed, keeping current snapshot")
                    }
                },
                Ok(_) => {}
                Err(e) => tracing::error!(path = ?self.path, error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Settings watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(file: &mut tempfile::NamedTempFile, content: &str) {
        let f = file.as_file_mut();
        f.set_len(0).unwrap();
        std::io::Seek::rewind(f).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.sync_all().unwrap();
    }

    #[test]
    fn test_reload_swaps_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write(&mut file, "[settings.endpoint]\nread-class-properties = false\n");

        let store = Arc::new(SettingsStore::new(SettingsSnapshot::default()));
        let watcher = SettingsWatcher::new(file.path(), store.clone());
        watcher.reload().unwrap();
        assert_eq!(store.snapshot().get("endpoint.read-class-properties"), Some("false"));

        write(
            &mut file,
            "[settings.endpoint]\nread-class-properties = true\n\n[settings.endpoint.config]\n\"com.example.Foo.x\" = \"1\"\n",
        );
        let snapshot = watcher.reload().unwrap();

        assert_eq!(snapshot.get("endpoint.read-class-properties"), Some("true"));
        assert_eq!(snapshot.get("endpoint.config.com.example.Foo.x"), Some("1"));
        assert_eq!(*store.snapshot(), *snapshot);
    }

    #[test]
    fn test_invalid_file_keeps_current_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write(&mut file, "[settings]\nmode = \"a\"\n");

        let store = Arc::new(SettingsStore::new(SettingsSnapshot::default()));
        let watcher = SettingsWatcher::new(file.path(), store.clone());
        watcher.reload().unwrap();

        // Duplicate port ids fail validation.
        write(
            &mut file,
            "[settings]\nmode = \"b\"\n\n[[endpoints]]\nport_id = \"p\"\nclass = \"c\"\n\n[[endpoints]]\nport_id = \"p\"\nclass = \"c\"\n",
        );
        assert!(matches!(watcher.reload(), Err(ConfigError::Validation(_))));
        assert_eq!(store.snapshot().get("mode"), Some("a"));
    }
}
