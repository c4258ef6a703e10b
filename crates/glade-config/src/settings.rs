//! Key-value settings remembered between runs.
//!
//! Unlike [`Config`](crate::Config), which the user edits, settings are
//! written by the application itself (for example the last seed used).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// A string key-value store.
pub trait SettingsStore {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);
}

/// Settings held only in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Settings persisted as a RON map.
#[derive(Debug, Clone)]
pub struct RonSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl RonSettings {
    /// Load settings from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let values = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
            ron::from_str(&contents).map_err(ConfigError::ParseError)?
        } else {
            BTreeMap::new()
        };
        log::debug!("Loaded {} settings from {}", values.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Write the store back to the path it was loaded from.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        let serialized =
            ron::ser::to_string_pretty(&self.values, ron::ser::PrettyConfig::new())
                .map_err(ConfigError::SerializeError)?;
        std::fs::write(&self.path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// File the store loads from and saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for RonSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_settings_get_set() {
        let mut settings = MemorySettings::new();
        assert_eq!(settings.get("terrain.last_seed"), None);
        settings.set("terrain.last_seed", "17".to_string());
        assert_eq!(settings.get("terrain.last_seed").as_deref(), Some("17"));
        settings.set("terrain.last_seed", "18".to_string());
        assert_eq!(settings.get("terrain.last_seed").as_deref(), Some("18"));
    }

    #[test]
    fn test_ron_settings_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RonSettings::load(&dir.path().join("settings.ron")).unwrap();
        assert_eq!(settings.get("anything"), None);
    }

    #[test]
    fn test_ron_settings_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ron");

        let mut settings = RonSettings::load(&path).unwrap();
        settings.set("terrain.last_seed", "123".to_string());
        settings.save().unwrap();

        let reloaded = RonSettings::load(&path).unwrap();
        assert_eq!(reloaded.get("terrain.last_seed").as_deref(), Some("123"));
        assert_eq!(reloaded.path(), path.as_path());
    }

    #[test]
    fn test_ron_settings_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        std::fs::write(&path, "not a map").unwrap();
        assert!(matches!(
            RonSettings::load(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
