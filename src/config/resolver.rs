//! Effective configuration for an endpoint.
//!
//! Two modes, selected by [`READ_CLASS_PROPERTIES`]:
//! - default: the feature configuration is the whole settings view and the
//!   endpoint gets no per-class properties;
//! - explicit: the feature configuration is suppressed and the endpoint
//!   receives only the settings under its class prefix, prefix stripped.
//!
//! Explicit mode does not merge the two sources.

use std::collections::BTreeMap;

use crate::config::settings::SettingsSnapshot;

/// Boolean setting that switches to explicit per-class properties.
pub const READ_CLASS_PROPERTIES: &str = "endpoint.read-class-properties";

/// Prefix of per-class settings: `<prefix><class name>.<key>`.
pub const ENDPOINT_CONFIG_PREFIX: &str = "endpoint.config.";

/// Suffix of the per-class key listing enabled features.
pub const FEATURES_SUFFIX: &str = "endpoint.features";

/// Read-only configuration derived from a settings snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationView {
    entries: BTreeMap<String, String>,
}

impl ConfigurationView {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `settings` selects explicit mode.
pub fn explicit_mode(settings: &SettingsSnapshot) -> bool {
    settings.get_bool(READ_CLASS_PROPERTIES, false)
}

/// Feature-level configuration: the full view, or `None` in explicit mode.
pub fn resolve_feature_config(explicit: bool, settings: &SettingsSnapshot) -> Option<ConfigurationView> {
    if explicit {
        return None;
    }
    Some(ConfigurationView {
        entries: settings.all_entries().clone(),
    })
}

/// Per-class endpoint properties: `None` unless in explicit mode.
pub fn resolve_endpoint_config(
    explicit: bool,
    class_name: &str,
    settings: &SettingsSnapshot,
) -> Option<BTreeMap<String, String>> {
    if !explicit {
        return None;
    }

    let prefix = format!("{}{}.", ENDPOINT_CONFIG_PREFIX, class_name);
    Some(
        settings
            .all_entries()
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|stripped| (stripped.to_string(), value.clone()))
            })
            .collect(),
    )
}

/// Key naming the features of `class_name` in the feature view.
pub fn feature_property_key(class_name: &str) -> String {
    format!("{}.{}", class_name, FEATURES_SUFFIX)
}

/// Features enabled for `class_name`, from a comma-separated list.
pub fn features_for(view: &ConfigurationView, class_name: &str) -> Vec<String> {
    view.get(&feature_property_key(class_name))
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SettingsSnapshot {
        SettingsSnapshot::from_pairs([
            ("endpoint.config.com.example.Foo.x", "1"),
            ("endpoint.config.com.example.FooBar.y", "3"),
            ("endpoint.config.other.y", "2"),
            ("com.example.Foo.endpoint.features", "logging, gzip,"),
        ])
    }

    #[test]
    fn test_endpoint_config_strips_matching_prefix() {
        let props = resolve_endpoint_config(true, "com.example.Foo", &settings()).unwrap();
        assert_eq!(props, BTreeMap::from([("x".to_string(), "1".to_string())]));
    }

    #[test]
    fn test_endpoint_config_empty_is_some() {
        let props = resolve_endpoint_config(true, "com.example.Missing", &settings());
        assert_eq!(props, Some(BTreeMap::new()));
    }

    #[test]
    fn test_default_mode() {
        let s = settings();
        assert_eq!(resolve_endpoint_config(false, "com.example.Foo", &s), None);
        let view = resolve_feature_config(false, &s).unwrap();
        assert_eq!(view.entries(), s.all_entries());
        assert!(resolve_feature_config(true, &s).is_none());
    }

    #[test]
    fn test_features_for_class() {
        let view = resolve_feature_config(false, &settings()).unwrap();
        assert_eq!(features_for(&view, "com.example.Foo"), vec!["logging", "gzip"]);
        assert!(features_for(&view, "com.example.Other").is_empty());
    }

    #[test]
    fn test_explicit_mode_flag() {
        assert!(!explicit_mode(&settings()));
        assert!(explicit_mode(&SettingsSnapshot::from_pairs([(READ_CLASS_PROPERTIES, "true")])));
    }
}
