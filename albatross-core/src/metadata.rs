//! Export metadata assembly.
//!
//! Turns an article plus its free-form key/value entries into the
//! normalized mapping the front-matter serializer renders. Values are a
//! tagged variant rather than a dynamic map, so rendering is exhaustive.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::Config;
use crate::models::{Article, User};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Scalar(String),
    Bool(bool),
    /// Accumulated values for a multi-value key; sorted at render time
    Multi(BTreeSet<String>),
}

impl MetadataValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        MetadataValue::Scalar(value.into())
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Scalar(s) => f.write_str(s),
            // The generator's front-matter reader takes Python-style
            // boolean literals
            MetadataValue::Bool(true) => f.write_str("True"),
            MetadataValue::Bool(false) => f.write_str("False"),
            MetadataValue::Multi(values) => {
                let mut first = true;
                for value in values {
                    if !first {
                        f.write_str(", ")?;
                    }
                    f.write_str(value)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

/// A string-keyed mapping that remembers insertion order, so serialized
/// documents are deterministic: free-form entries first (in attachment
/// order), fixed fields after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, MetadataValue)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing key keeps its position but the value
    /// is overwritten (last write wins).
    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Accumulate a value under a multi-value key. A scalar already
    /// sitting under the key is folded into the set.
    pub fn add_multi(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, MetadataValue::Multi(values))) => {
                values.insert(value);
            }
            Some(slot) => {
                let mut values = BTreeSet::new();
                if let MetadataValue::Scalar(prev) = &slot.1 {
                    values.insert(prev.clone());
                }
                values.insert(value);
                slot.1 = MetadataValue::Multi(values);
            }
            None => {
                let mut values = BTreeSet::new();
                values.insert(value);
                self.entries.push((key, MetadataValue::Multi(values)));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assemble the export metadata for an article.
///
/// Free-form entries are partitioned first: multi-value keys accumulate
/// into deduplicated sets, everything else is last-write-wins in
/// attachment order. The fixed fields are overlaid afterwards and always
/// win over a colliding free-form key.
pub fn assemble_metadata(article: &Article, author: &User, config: &Config) -> Metadata {
    let mut metadata = Metadata::new();

    for entry in &article.data {
        if config.is_multi_value_key(&entry.key) {
            metadata.add_multi(entry.key.clone(), entry.value.clone());
        } else {
            metadata.insert(entry.key.clone(), MetadataValue::scalar(entry.value.clone()));
        }
    }

    metadata.insert("author", MetadataValue::scalar(author.username.clone()));
    metadata.insert("title", MetadataValue::scalar(article.title.clone()));
    metadata.insert(
        "date",
        MetadataValue::scalar(config.format_timestamp(article.created_at)),
    );
    metadata.insert(
        "modified",
        MetadataValue::scalar(config.format_timestamp(article.updated_at)),
    );
    metadata.insert("slug", MetadataValue::scalar(article.slug.clone()));
    metadata.insert(
        "summary",
        MetadataValue::scalar(article.summary.clone().unwrap_or_default()),
    );
    metadata.insert("status", MetadataValue::scalar(article.status()));
    metadata.insert("lang", MetadataValue::scalar(config.default_lang()));
    metadata.insert("translation", MetadataValue::Bool(false));

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetadataEntry, NewArticle};
    use chrono::NaiveDate;

    fn fixture() -> (Article, User, Config) {
        let now = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let user = User::new(1, "alice", "alice@example.com", now);
        let article = Article::new(
            1,
            1,
            "test-article-0a1b2c3d".into(),
            NewArticle {
                title: "Test Article".into(),
                content: "This is the content".into(),
                is_draft: true,
                ..NewArticle::default()
            },
            now,
        );
        (article, user, Config::default())
    }

    fn entry(id: u64, key: &str, value: &str) -> MetadataEntry {
        MetadataEntry {
            id,
            key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_fixed_fields_only() {
        let (article, user, config) = fixture();
        let metadata = assemble_metadata(&article, &user, &config);

        let keys: Vec<&str> = metadata.keys().collect();
        assert_eq!(
            keys,
            vec![
                "author",
                "title",
                "date",
                "modified",
                "slug",
                "summary",
                "status",
                "lang",
                "translation"
            ]
        );
        assert_eq!(
            metadata.get("status"),
            Some(&MetadataValue::scalar("draft"))
        );
        assert_eq!(metadata.get("lang"), Some(&MetadataValue::scalar("en")));
        assert_eq!(metadata.get("translation"), Some(&MetadataValue::Bool(false)));
        assert_eq!(
            metadata.get("date"),
            Some(&MetadataValue::scalar("2022-01-01 12:00:00"))
        );
        assert_eq!(metadata.get("summary"), Some(&MetadataValue::scalar("")));
    }

    #[test]
    fn test_multi_value_keys_accumulate() {
        let (mut article, user, config) = fixture();
        article.data = vec![
            entry(1, "keywords", "test"),
            entry(2, "keywords", "pytest"),
            entry(3, "tags", "til"),
            entry(4, "category", "helpful"),
        ];

        let metadata = assemble_metadata(&article, &user, &config);

        let expected: BTreeSet<String> = ["pytest", "test"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            metadata.get("keywords"),
            Some(&MetadataValue::Multi(expected))
        );
        assert_eq!(
            metadata.get("category"),
            Some(&MetadataValue::scalar("helpful"))
        );

        // Free-form keys precede the fixed block, in attachment order
        let keys: Vec<&str> = metadata.keys().take(3).collect();
        assert_eq!(keys, vec!["keywords", "tags", "category"]);
    }

    #[test]
    fn test_duplicate_multi_values_deduplicate() {
        let (mut article, user, config) = fixture();
        article.data = vec![entry(1, "keywords", "test"), entry(2, "keywords", "test")];

        let metadata = assemble_metadata(&article, &user, &config);
        match metadata.get("keywords") {
            Some(MetadataValue::Multi(values)) => assert_eq!(values.len(), 1),
            other => panic!("expected Multi, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_last_write_wins() {
        let (mut article, user, config) = fixture();
        article.data = vec![entry(1, "category", "first"), entry(2, "category", "second")];

        let metadata = assemble_metadata(&article, &user, &config);
        assert_eq!(
            metadata.get("category"),
            Some(&MetadataValue::scalar("second"))
        );
    }

    #[test]
    fn test_fixed_fields_override_free_form() {
        let (mut article, user, config) = fixture();
        article.data = vec![entry(1, "author", "impostor"), entry(2, "slug", "fake")];

        let metadata = assemble_metadata(&article, &user, &config);
        assert_eq!(metadata.get("author"), Some(&MetadataValue::scalar("alice")));
        assert_eq!(
            metadata.get("slug"),
            Some(&MetadataValue::scalar("test-article-0a1b2c3d"))
        );
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let (mut article, user, config) = fixture();
        article.data = vec![entry(1, "keywords", "test"), entry(2, "tags", "til")];

        let first = assemble_metadata(&article, &user, &config);
        let second = assemble_metadata(&article, &user, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_multi_value_renders_sorted() {
        let mut values = BTreeSet::new();
        values.insert("test".to_string());
        values.insert("pytest".to_string());
        assert_eq!(MetadataValue::Multi(values).to_string(), "pytest, test");
    }

    #[test]
    fn test_bool_renders_python_style() {
        assert_eq!(MetadataValue::Bool(false).to_string(), "False");
        assert_eq!(MetadataValue::Bool(true).to_string(), "True");
    }
}
