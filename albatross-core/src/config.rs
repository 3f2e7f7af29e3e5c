//! Configuration parsing and management.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid date format string: {0}")]
    BadDateFormat(String),
}

/// Main configuration struct matching the albatross.yml schema.
///
/// There is no ambient settings object; whoever needs configuration gets
/// handed this struct explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    /// strftime-style format applied to the date/modified export fields
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Metadata keys whose values accumulate into a list instead of
    /// overwriting each other
    #[serde(default = "default_multi_value_keys")]
    pub multi_value_keys: Vec<String>,

    #[serde(default = "default_lang")]
    pub default_lang: String,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_date_format() -> String {
    String::from("%Y-%m-%d %H:%M:%S")
}

fn default_multi_value_keys() -> Vec<String> {
    vec![String::from("tags"), String::from("keywords")]
}

fn default_lang() -> String {
    String::from("en")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,

    #[serde(default)]
    pub author: Option<String>,
}

fn default_site_title() -> String {
    String::from("An Albatross Site")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            author: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Content store file
    #[serde(default = "default_store_path")]
    pub store: PathBuf,

    /// Root under which per-user output directories and archives land
    #[serde(default = "default_output_path")]
    pub output: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("albatross.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store: default_store_path(),
            output: default_output_path(),
        }
    }
}

/// The external static-site generator. Opaque: albatross only hands it a
/// settings file and inspects its exit status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_command")]
    pub command: String,
}

fn default_generator_command() -> String {
    String::from("pelican")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_generator_command(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        if !date_format_is_valid(&config.date_format) {
            return Err(ConfigError::BadDateFormat(config.date_format));
        }

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Get the content store file, resolved relative to the config file
    pub fn store_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.store)
    }

    /// Get the output root, resolved relative to the config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    pub fn generator_command(&self) -> &str {
        &self.generator.command
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    pub fn is_multi_value_key(&self, key: &str) -> bool {
        self.multi_value_keys.iter().any(|k| k == key)
    }

    /// Format a timestamp with the configured date format. The format
    /// string was validated at load time.
    pub fn format_timestamp(&self, ts: NaiveDateTime) -> String {
        ts.format(&self.date_format).to_string()
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            paths: PathsConfig::default(),
            generator: GeneratorConfig::default(),
            date_format: default_date_format(),
            multi_value_keys: default_multi_value_keys(),
            default_lang: default_lang(),
            config_path: None,
        }
    }
}

/// A format string is usable if formatting a probe timestamp succeeds;
/// chrono only reports bad specifiers when the output is written.
fn date_format_is_valid(format: &str) -> bool {
    use std::fmt::Write;

    let probe = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let mut out = String::new();
    write!(out, "{}", probe.format(format)).is_ok()
}
