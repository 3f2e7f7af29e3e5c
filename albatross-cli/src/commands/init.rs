//! Project initialization.

use albatross_core::{Config, MemoryStore};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"site:
  title: "An Albatross Site"
  author: null

paths:
  store: albatross.json
  output: output

generator:
  command: pelican

date_format: "%Y-%m-%d %H:%M:%S"
multi_value_keys: [tags, keywords]
default_lang: en
"#;

/// Write a default config and an empty content store.
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let target = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(target)
        .with_context(|| format!("Failed to create project directory {:?}", target))?;

    let config_path = target.join("albatross.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists, refusing to overwrite", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    let config = Config::from_file(&config_path).context("Failed to load fresh configuration")?;
    let store = MemoryStore::new();
    store
        .save(&config.store_path())
        .with_context(|| format!("Failed to write {:?}", config.store_path()))?;

    tracing::info!("Initialized albatross project in {:?}", target);
    println!("Initialized albatross project in {}", target.display());
    Ok(())
}
