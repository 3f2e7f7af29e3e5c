//! User account commands.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use super::{open, persist};

pub fn add_user(
    config_path: &Path,
    username: &str,
    email: &str,
    about: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    let (config, mut store) = open(config_path)?;

    let created = store.add_user(username, email)?;
    let mut user = created.clone();
    if let Some(about) = about {
        user.about = Some(about.to_string());
    }
    if let Some(password) = password {
        user.set_password(password)
            .context("Failed to hash password")?;
    }
    store.update_user(user)?;
    persist(&config, &store)?;

    println!("Created user '{}' (id {})", created.username, created.id);
    Ok(())
}

pub fn list_users(config_path: &Path, json: bool) -> Result<()> {
    let (_, store) = open(config_path)?;
    let users = store.users();

    if json {
        let payload: Vec<_> = users
            .iter()
            .map(|u| {
                json!({
                    "id": u.id,
                    "username": u.username,
                    "email": u.email,
                    "about": u.about,
                    "joined_at": u.joined_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for user in users {
            let articles = store.articles_for_user(user.id).len();
            println!("{} <{}> - {} articles", user.username, user.email, articles);
        }
    }
    Ok(())
}
