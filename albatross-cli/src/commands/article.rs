//! Article authoring commands.

use albatross_core::models::{ArticleUpdate, NewArticle};
use albatross_core::{assemble_metadata, render_post};
use anyhow::{anyhow, Result};
use serde_json::json;
use std::path::Path;

use super::{open, persist, user_id_for};

pub struct NewArticleArgs {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub draft: bool,
}

pub struct EditArticleArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub draft: Option<bool>,
}

pub fn new_article(config_path: &Path, username: &str, args: NewArticleArgs) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let user_id = user_id_for(&store, username)?;

    let article = store.create_article(
        user_id,
        NewArticle {
            title: args.title,
            content: args.content,
            summary: args.summary,
            image_url: args.image_url,
            is_draft: args.draft,
        },
    )?;
    persist(&config, &store)?;

    println!("Created article '{}' with slug {}", article.title, article.slug);
    Ok(())
}

pub fn list_articles(config_path: &Path, username: &str, json: bool) -> Result<()> {
    let (_, store) = open(config_path)?;
    let user_id = user_id_for(&store, username)?;
    let articles = store.articles_for_user(user_id);

    if json {
        let payload: Vec<_> = articles
            .iter()
            .map(|a| {
                json!({
                    "id": a.id,
                    "slug": a.slug,
                    "title": a.title,
                    "status": a.status(),
                    "created_at": a.created_at,
                    "updated_at": a.updated_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for article in &articles {
            println!("- [{}] {} ({})", article.status(), article.title, article.slug);
        }
    }
    Ok(())
}

pub fn show_article(config_path: &Path, slug: &str, rendered: bool) -> Result<()> {
    let (config, store) = open(config_path)?;
    let article = store
        .article_by_slug(slug)
        .ok_or_else(|| anyhow!("no such article: {}", slug))?;

    if rendered {
        let author = store
            .user(article.user_id)
            .ok_or_else(|| anyhow!("article {} has no owner", slug))?;
        let metadata = assemble_metadata(&article, author, &config);
        print!("{}", render_post(&metadata, &article.content));
    } else {
        println!("title:   {}", article.title);
        println!("slug:    {}", article.slug);
        println!("status:  {}", article.status());
        if let Some(summary) = &article.summary {
            println!("summary: {}", summary);
        }
        for entry in &article.data {
            println!("{}: {}", entry.key, entry.value);
        }
        println!("\n{}", article.content);
    }
    Ok(())
}

pub fn edit_article(config_path: &Path, slug: &str, args: EditArticleArgs) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let article = store
        .article_by_slug(slug)
        .ok_or_else(|| anyhow!("no such article: {}", slug))?;

    let updated = store.update_article(
        article.id,
        ArticleUpdate {
            title: args.title,
            content: args.content,
            summary: args.summary,
            image_url: args.image_url,
            is_draft: args.draft,
        },
    )?;
    persist(&config, &store)?;

    println!("Updated article '{}' ({})", updated.title, updated.slug);
    Ok(())
}

pub fn delete_article(config_path: &Path, slug: &str) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let article = store
        .article_by_slug(slug)
        .ok_or_else(|| anyhow!("no such article: {}", slug))?;

    store.delete_article(article.id)?;
    persist(&config, &store)?;

    println!("Deleted article '{}'", slug);
    Ok(())
}

pub fn tag_article(config_path: &Path, slug: &str, key: &str, value: &str) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let article = store
        .article_by_slug(slug)
        .ok_or_else(|| anyhow!("no such article: {}", slug))?;

    store.attach_data(article.id, key, value)?;
    persist(&config, &store)?;

    println!("Tagged '{}' with {}: {}", slug, key, value);
    Ok(())
}

pub fn untag_article(config_path: &Path, slug: &str, key: &str, value: &str) -> Result<()> {
    let (config, mut store) = open(config_path)?;
    let article = store
        .article_by_slug(slug)
        .ok_or_else(|| anyhow!("no such article: {}", slug))?;

    store.detach_data(article.id, key, value)?;
    persist(&config, &store)?;

    println!("Untagged {}: {} from '{}'", key, value, slug);
    Ok(())
}
