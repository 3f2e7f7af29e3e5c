//! Command implementations.

mod article;
mod compile;
mod init;
mod settings;
mod user;

pub use article::{
    delete_article, edit_article, list_articles, new_article, show_article, tag_article,
    untag_article, EditArticleArgs, NewArticleArgs,
};
pub use compile::compile_site;
pub use init::init_project;
pub use settings::{export_settings, import_settings, set_setting, show_settings};
pub use user::{add_user, list_users};

use albatross_core::{Config, MemoryStore};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Load the config and the content store it points at.
pub(crate) fn open(config_path: &Path) -> Result<(Config, MemoryStore)> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let store_path = config.store_path();
    let store = MemoryStore::load(&store_path).with_context(|| {
        format!(
            "Failed to load content store {:?} (run 'albatross init' first?)",
            store_path
        )
    })?;
    Ok((config, store))
}

/// Write the store back after a successful mutation.
pub(crate) fn persist(config: &Config, store: &MemoryStore) -> Result<()> {
    let store_path = config.store_path();
    store
        .save(&store_path)
        .with_context(|| format!("Failed to write content store {:?}", store_path))
}

/// Resolve a username to its user id.
pub(crate) fn user_id_for(store: &MemoryStore, username: &str) -> Result<u64> {
    store
        .user_by_username(username)
        .map(|u| u.id)
        .ok_or_else(|| anyhow!("no such user: {}", username))
}
