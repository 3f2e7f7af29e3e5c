//! Per-user generator settings commands.

use albatross_core::models::UserSettings;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use super::{open, persist, user_id_for};

pub fn show_settings(config_path: &Path, username: &str, json: bool) -> Result<()> {
    let (_, store) = open(config_path)?;
    let user_id = user_id_for(&store, username)?;
    let settings = store.settings_for_user(user_id);

    if json {
        println!("{}", serde_json::to_string_pretty(settings.document.as_map())?);
    } else {
        for (key, value) in settings.document.as_map() {
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

pub fn set_setting(config_path: &Path, username: &str, key: &str, value: &str) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let user_id = user_id_for(&store, username)?;

    // Values that parse as JSON keep their type; everything else is a string
    let value: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.into()));

    let mut settings = store.settings_for_user(user_id);
    settings.document.set(key, value);
    store.save_settings(settings)?;
    persist(&config, &store)?;

    println!("Set {} for '{}'", key, username);
    Ok(())
}

pub fn import_settings(config_path: &Path, username: &str, file: &Path) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let user_id = user_id_for(&store, username)?;

    let mut settings = store.settings_for_user(user_id);
    settings
        .document
        .update_from_file(file)
        .with_context(|| format!("Failed to apply settings file {:?}", file))?;
    store.save_settings(settings)?;
    persist(&config, &store)?;

    println!("Applied settings from {}", file.display());
    Ok(())
}

pub fn export_settings(config_path: &Path, username: &str, output: Option<&Path>) -> Result<()> {
    let (_, store) = open(config_path)?;
    let user = store
        .user_by_username(username)
        .ok_or_else(|| anyhow::anyhow!("no such user: {}", username))?;
    let settings = store.settings_for_user(user.id);

    let target_dir = output.unwrap_or_else(|| Path::new("."));
    let file_name = UserSettings::export_file_name(&user.username_lower);
    let path = settings
        .document
        .write(&target_dir.join(file_name))
        .context("Failed to write settings file")?;

    println!("Settings written to {}", path.display());
    Ok(())
}
