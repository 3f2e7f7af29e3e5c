//! Generator settings documents.
//!
//! The external static-site generator is driven by a JSON-shaped
//! key/value document. Every user gets one, seeded from the generator's
//! defaults; the compiler overlays the input/output paths before each
//! run.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A versionable configuration document for the external generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratorSettings {
    values: Map<String, Value>,
}

impl Default for GeneratorSettings {
    /// Seeded from the generator's default configuration.
    fn default() -> Self {
        let mut values = Map::new();
        values.insert("SITENAME".into(), json!("A Pelican Blog"));
        values.insert("SITEURL".into(), json!(""));
        values.insert("PATH".into(), json!("."));
        values.insert("OUTPUT_PATH".into(), json!("output"));
        values.insert("OUTPUT_RETENTION".into(), json!([]));
        values.insert("DELETE_OUTPUT_DIRECTORY".into(), json!(false));
        values.insert("DEFAULT_LANG".into(), json!("en"));
        values.insert("DEFAULT_PAGINATION".into(), json!(false));
        values.insert("THEME".into(), json!("notmyidea"));
        values.insert("DRAFT_SAVE_AS".into(), json!("drafts/{slug}.html"));
        values.insert(
            "JINJA_ENVIRONMENT".into(),
            json!({"trim_blocks": true, "lstrip_blocks": true, "extensions": []}),
        );
        values.insert("READERS".into(), json!({}));
        Self { values }
    }
}

impl GeneratorSettings {
    /// An empty document, no defaults.
    pub fn empty() -> Self {
        Self { values: Map::new() }
    }

    /// Load a document from a JSON file, overlaid on the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        settings.update_from_file(path)?;
        Ok(settings)
    }

    /// Look up a value. Dotted keys descend into nested objects
    /// (`JINJA_ENVIRONMENT.trim_blocks`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Set a value. Dotted keys descend into nested objects, creating
    /// intermediate maps as needed; a non-object in the way is replaced.
    pub fn set(&mut self, key: &str, value: Value) {
        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = match parts.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut current = &mut self.values;
        for part in parents {
            let slot = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = slot.as_object_mut().unwrap();
        }
        current.insert(last.to_string(), value);
    }

    /// Overlay every entry of `new_settings` onto this document.
    pub fn update_from_map(&mut self, new_settings: &Map<String, Value>) {
        for (key, value) in new_settings {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Overlay the contents of a JSON file onto this document.
    pub fn update_from_file(&mut self, path: &Path) -> Result<(), SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: Map<String, Value> = serde_json::from_str(&contents)?;
        self.update_from_map(&parsed);
        Ok(())
    }

    /// Merge another document into this one; the other document wins.
    pub fn merge(&mut self, other: &GeneratorSettings) {
        self.update_from_map(&other.values);
    }

    /// Write the document to a JSON file and return the path.
    pub fn write(&self, path: &Path) -> Result<PathBuf, SettingsError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json)?;
        Ok(path.to_path_buf())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_cover_generator_keys() {
        let settings = GeneratorSettings::default();
        assert!(settings.get("SITENAME").is_some());
        assert!(settings.get("OUTPUT_RETENTION").is_some());
        assert_eq!(settings.get("OUTPUT_PATH"), Some(&json!("output")));
        assert_eq!(settings.get("DEFAULT_LANG"), Some(&json!("en")));
    }

    #[test]
    fn test_update_from_map() {
        let mut settings = GeneratorSettings::default();
        let mut new_settings = Map::new();
        new_settings.insert("SITENAME".into(), json!("My New Site Name"));
        settings.update_from_map(&new_settings);
        assert_eq!(settings.get("SITENAME"), Some(&json!("My New Site Name")));
    }

    #[test]
    fn test_update_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_settings.json");
        std::fs::write(&path, r#"{"SITENAME": "My Pelican Site"}"#).unwrap();

        let mut settings = GeneratorSettings::default();
        settings.update_from_file(&path).unwrap();
        assert_eq!(settings.get("SITENAME"), Some(&json!("My Pelican Site")));
        // Untouched defaults survive the overlay
        assert_eq!(settings.get("OUTPUT_PATH"), Some(&json!("output")));
    }

    #[test]
    fn test_nested_set_and_get() {
        let mut settings = GeneratorSettings::default();
        assert_eq!(
            settings.get("JINJA_ENVIRONMENT.trim_blocks"),
            Some(&json!(true))
        );

        settings.set("JINJA_ENVIRONMENT.trim_blocks", json!(false));
        assert_eq!(
            settings.get("JINJA_ENVIRONMENT.trim_blocks"),
            Some(&json!(false))
        );

        settings.set("READERS.0.1", json!(""));
        assert_eq!(settings.get("READERS.0.1"), Some(&json!("")));
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = GeneratorSettings::default();
        settings.set("SITENAME", json!("My New Site Name"));
        settings.set("JINJA_ENVIRONMENT.trim_blocks", json!(false));
        settings.write(&path).unwrap();

        let loaded = GeneratorSettings::load(&path).unwrap();
        assert_eq!(loaded.get("SITENAME"), Some(&json!("My New Site Name")));
        assert_eq!(
            loaded.get("JINJA_ENVIRONMENT.trim_blocks"),
            Some(&json!(false))
        );
        assert_eq!(loaded.get("OUTPUT_PATH"), Some(&json!("output")));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut settings = GeneratorSettings::default();
        let mut other = GeneratorSettings::empty();
        other.set("SITENAME", json!("Overridden"));
        settings.merge(&other);
        assert_eq!(settings.get("SITENAME"), Some(&json!("Overridden")));
    }
}
