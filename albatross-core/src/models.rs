//! Entity structs for users, articles, and their metadata.
//!
//! Normalization that the original system hid behind persistence hooks
//! (username/email lowercasing, slug assignment, timestamp bumping) is
//! done here in explicit constructors and mutators, so every side effect
//! is visible at the call site.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::GeneratorSettings;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// An account that owns articles and a settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    /// Display form, case preserved
    pub username: String,

    /// Lowercase canonical form; unique, and used to derive per-user
    /// output locations
    pub username_lower: String,

    /// Stored lowercase
    pub email: String,

    #[serde(default)]
    pub about: Option<String>,

    /// Argon2 salted hash; never the plain credential
    #[serde(default)]
    pub password_hash: Option<String>,

    pub joined_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Build a user, normalizing the canonical username and email forms.
    pub fn new(id: u64, username: &str, email: &str, now: NaiveDateTime) -> Self {
        Self {
            id,
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: email.to_lowercase(),
            about: None,
            password_hash: None,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Hash and store a new password credential.
    pub fn set_password(&mut self, password: &str) -> Result<(), PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        self.password_hash = Some(hash.to_string());
        Ok(())
    }

    /// Check a candidate password against the stored hash. Users without
    /// a credential reject everything.
    pub fn verify_password(&self, password: &str) -> bool {
        let Some(stored) = &self.password_hash else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Input for creating an article; the slug and timestamps are assigned
/// by the store at insert time.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub is_draft: bool,
}

/// Fields an edit may touch. The slug is deliberately absent: it is
/// assigned once at creation and never regenerated.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub is_draft: Option<bool>,
}

/// A single authored piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,

    pub title: String,

    pub content: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    /// Owning user
    pub user_id: u64,

    /// Unique URL-safe identifier, assigned exactly once at creation
    pub slug: String,

    #[serde(default)]
    pub is_draft: bool,

    /// Attached metadata entries, in attachment order. Loaded by the
    /// store; empty in the persisted form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<MetadataEntry>,
}

impl Article {
    pub fn new(id: u64, user_id: u64, slug: String, input: NewArticle, now: NaiveDateTime) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            summary: input.summary,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
            user_id,
            slug,
            is_draft: input.is_draft,
            data: Vec::new(),
        }
    }

    /// Apply an edit and bump the modification timestamp. The slug is
    /// untouched.
    pub fn apply(&mut self, update: ArticleUpdate, now: NaiveDateTime) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(summary) = update.summary {
            self.summary = Some(summary);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(is_draft) = update.is_draft {
            self.is_draft = is_draft;
        }
        self.updated_at = now;
    }

    pub fn status(&self) -> &'static str {
        if self.is_draft {
            "draft"
        } else {
            "published"
        }
    }

    /// Entries under `key`, in attachment order.
    pub fn filter_data_by_key(&self, key: &str) -> Vec<&MetadataEntry> {
        self.data.iter().filter(|d| d.key == key).collect()
    }
}

/// A reusable key/value tag. One entry may be attached to any number of
/// articles; detaching never destroys the entry itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub id: u64,
    pub key: String,
    pub value: String,
}

/// Per-user generator configuration document, one-to-one with the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: u64,
    pub document: GeneratorSettings,
}

impl UserSettings {
    /// Fresh settings seeded from the generator defaults.
    pub fn seeded(user_id: u64) -> Self {
        Self {
            user_id,
            document: GeneratorSettings::default(),
        }
    }

    /// Canonical export filename for this user's settings document.
    pub fn export_file_name(username_lower: &str) -> String {
        format!("{}-settings.json", username_lower)
    }
}
