//! Content store.
//!
//! Explicit repository methods over users, articles, metadata entries,
//! and settings documents. Every accessor returns already-loaded data;
//! there is no lazy traversal. `&mut self` methods are the transaction
//! boundary: slug allocation and the insert that persists it happen
//! inside the same call.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::models::{Article, ArticleUpdate, MetadataEntry, NewArticle, User, UserSettings};
use crate::slug::{SlugError, SlugGenerator, SlugIndex};

const STORE_VERSION: &str = "1";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse store file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store file version '{0}' is not supported")]
    Version(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Slug(#[from] SlugError),
}

/// In-memory store with whole-file JSON persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    users: BTreeMap<u64, User>,
    articles: BTreeMap<u64, Article>,
    entries: BTreeMap<u64, MetadataEntry>,
    /// Article id -> attached entry ids, in attachment order
    article_entries: BTreeMap<u64, Vec<u64>>,
    settings: BTreeMap<u64, UserSettings>,

    next_user_id: u64,
    next_article_id: u64,
    next_entry_id: u64,

    #[serde(skip)]
    slug_gen: SlugGenerator,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: String,
    saved_at: String,
    store: MemoryStore,
}

impl SlugIndex for MemoryStore {
    fn contains(&self, slug: &str) -> bool {
        self.articles.values().any(|a| a.slug == slug)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store persisted with [`MemoryStore::save`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let data = std::fs::read(path)?;
        let file: StoreFile = serde_json::from_slice(&data)?;
        if file.version != STORE_VERSION {
            return Err(StoreError::Version(file.version));
        }
        Ok(file.store)
    }

    /// Persist the whole store as one JSON document.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = StoreFile {
            version: STORE_VERSION.to_string(),
            saved_at: Utc::now().to_rfc3339(),
            store: self.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    // ---- users ----

    /// Create a user. The canonical lowercase username and the email must
    /// both be free.
    pub fn add_user(&mut self, username: &str, email: &str) -> Result<User, StoreError> {
        let candidate = User::new(0, username, email, Self::now());
        if self
            .users
            .values()
            .any(|u| u.username_lower == candidate.username_lower)
        {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                candidate.username_lower
            )));
        }
        if self.users.values().any(|u| u.email == candidate.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                candidate.email
            )));
        }

        self.next_user_id += 1;
        let user = User {
            id: self.next_user_id,
            ..candidate
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    /// Lookup by the canonical lowercase form.
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        let lower = username.to_lowercase();
        self.users.values().find(|u| u.username_lower == lower)
    }

    pub fn users(&self) -> Vec<&User> {
        self.users.values().collect()
    }

    pub fn update_user(&mut self, user: User) -> Result<(), StoreError> {
        if !self.users.contains_key(&user.id) {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        let mut user = user;
        user.updated_at = Self::now();
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Delete a user and every article they own. Ownership is exclusive,
    /// so the articles go with the user; shared metadata entries stay.
    pub fn delete_user(&mut self, id: u64) -> Result<(), StoreError> {
        if self.users.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("user {}", id)));
        }
        let owned: Vec<u64> = self
            .articles
            .values()
            .filter(|a| a.user_id == id)
            .map(|a| a.id)
            .collect();
        for article_id in owned {
            self.articles.remove(&article_id);
            self.article_entries.remove(&article_id);
        }
        self.settings.remove(&id);
        Ok(())
    }

    // ---- articles ----

    /// Create an article for `user_id`. The slug is allocated and the
    /// article persisted within this single call, so the uniqueness check
    /// and the insert cannot be interleaved with another create.
    pub fn create_article(&mut self, user_id: u64, input: NewArticle) -> Result<Article, StoreError> {
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }

        let slug = self.slug_gen.generate(&input.title, &*self)?;
        tracing::debug!("Allocated slug '{}' for '{}'", slug, input.title);

        self.next_article_id += 1;
        let article = Article::new(self.next_article_id, user_id, slug, input, Self::now());
        self.articles.insert(article.id, article.clone());
        Ok(article)
    }

    /// Fetch an article with its metadata entries loaded.
    pub fn article(&self, id: u64) -> Option<Article> {
        self.articles.get(&id).map(|a| self.with_data(a))
    }

    pub fn article_by_slug(&self, slug: &str) -> Option<Article> {
        self.articles
            .values()
            .find(|a| a.slug == slug)
            .map(|a| self.with_data(a))
    }

    /// All articles owned by `user_id`, in creation order, entries loaded.
    pub fn articles_for_user(&self, user_id: u64) -> Vec<Article> {
        self.articles
            .values()
            .filter(|a| a.user_id == user_id)
            .map(|a| self.with_data(a))
            .collect()
    }

    /// Apply an edit. The slug is never touched, whatever the update says
    /// about the title.
    pub fn update_article(&mut self, id: u64, update: ArticleUpdate) -> Result<Article, StoreError> {
        let article = self
            .articles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("article {}", id)))?;
        article.apply(update, Self::now());
        let article = article.clone();
        Ok(self.with_data(&article))
    }

    /// Delete an article. Its metadata links are removed; the entries
    /// themselves survive because they may be attached elsewhere.
    pub fn delete_article(&mut self, id: u64) -> Result<(), StoreError> {
        if self.articles.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("article {}", id)));
        }
        self.article_entries.remove(&id);
        Ok(())
    }

    // ---- metadata ----

    /// Attach a key/value pair to an article. An existing entry with the
    /// same pair is reused; otherwise one is created.
    pub fn attach_data(
        &mut self,
        article_id: u64,
        key: &str,
        value: &str,
    ) -> Result<MetadataEntry, StoreError> {
        if !self.articles.contains_key(&article_id) {
            return Err(StoreError::NotFound(format!("article {}", article_id)));
        }

        let entry = match self
            .entries
            .values()
            .find(|e| e.key == key && e.value == value)
        {
            Some(existing) => existing.clone(),
            None => {
                self.next_entry_id += 1;
                let entry = MetadataEntry {
                    id: self.next_entry_id,
                    key: key.to_string(),
                    value: value.to_string(),
                };
                self.entries.insert(entry.id, entry.clone());
                entry
            }
        };

        let links = self.article_entries.entry(article_id).or_default();
        if !links.contains(&entry.id) {
            links.push(entry.id);
        }
        Ok(entry)
    }

    /// Detach a key/value pair from an article. The entry itself is kept.
    pub fn detach_data(&mut self, article_id: u64, key: &str, value: &str) -> Result<(), StoreError> {
        let entry_id = self
            .entries
            .values()
            .find(|e| e.key == key && e.value == value)
            .map(|e| e.id)
            .ok_or_else(|| StoreError::NotFound(format!("metadata '{}: {}'", key, value)))?;

        let links = self
            .article_entries
            .get_mut(&article_id)
            .ok_or_else(|| StoreError::NotFound(format!("article {}", article_id)))?;
        links.retain(|id| *id != entry_id);
        Ok(())
    }

    /// Entries attached to an article, in attachment order.
    pub fn entries_for_article(&self, article_id: u64) -> Vec<MetadataEntry> {
        self.article_entries
            .get(&article_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.entries.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Articles a given entry is attached to.
    pub fn articles_for_entry(&self, entry_id: u64) -> Vec<u64> {
        self.article_entries
            .iter()
            .filter(|(_, ids)| ids.contains(&entry_id))
            .map(|(article_id, _)| *article_id)
            .collect()
    }

    fn with_data(&self, article: &Article) -> Article {
        let mut loaded = article.clone();
        loaded.data = self.entries_for_article(article.id);
        loaded
    }

    // ---- settings ----

    /// The user's settings document, seeded from the generator defaults
    /// when none has been saved yet.
    pub fn settings_for_user(&self, user_id: u64) -> UserSettings {
        self.settings
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| UserSettings::seeded(user_id))
    }

    pub fn save_settings(&mut self, settings: UserSettings) -> Result<(), StoreError> {
        if !self.users.contains_key(&settings.user_id) {
            return Err(StoreError::NotFound(format!("user {}", settings.user_id)));
        }
        self.settings.insert(settings.user_id, settings);
        Ok(())
    }
}
