//! Compile command implementation.

use albatross_core::{CompileOptions, SiteCompiler};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use super::open;

/// Compile every article a user owns into a static site archive.
pub fn compile_site(
    config_path: &Path,
    username: &str,
    temp_dir: Option<PathBuf>,
    keep_output_dir: bool,
) -> Result<()> {
    let (config, store) = open(config_path)?;

    let user = store
        .user_by_username(username)
        .ok_or_else(|| anyhow!("no such user: {}", username))?
        .clone();

    // Ownership filtering happens here; the compiler trusts its batch
    let articles = store.articles_for_user(user.id);
    let settings = store.settings_for_user(user.id);

    let compiler = SiteCompiler::new(config, settings.document);
    let opts = CompileOptions {
        temp_parent: temp_dir,
        keep_output_dir,
    };
    let site = compiler
        .compile(&user, &articles, &opts)
        .context("Failed to compile site")?;

    println!(
        "Compiled {} articles into {}",
        site.article_count,
        site.archive.display()
    );
    Ok(())
}
