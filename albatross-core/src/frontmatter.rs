//! Front-matter rendering and parsing.
//!
//! Documents have the shape expected by the external generator: a `---`
//! delimited `key: value` block, a blank line, then the body.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;
use thiserror::Error;

use crate::metadata::Metadata;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed post document: {0}")]
    Malformed(String),
}

/// Render metadata and body content into a front-matter document.
///
/// One `key: value` line per entry, in the mapping's insertion order.
/// Multi-value entries come out as a sorted, comma-separated list.
pub fn render_post(metadata: &Metadata, content: &str) -> String {
    let mut document = String::from("---\n");
    for (key, value) in metadata.iter() {
        document.push_str(key);
        document.push_str(": ");
        document.push_str(&value.to_string());
        document.push('\n');
    }
    document.push_str("---\n");
    document.push('\n');
    document.push_str(content);
    document
}

/// Write a rendered post into `base_dir` under a collision-resistant
/// name and return the path.
///
/// The file is created atomically but written directly; there is no
/// write-then-rename step.
pub fn write_post(metadata: &Metadata, content: &str, base_dir: &Path) -> Result<PathBuf, PostError> {
    let document = render_post(metadata, content);

    let mut file = Builder::new()
        .prefix("albatross-")
        .suffix(".md")
        .tempfile_in(base_dir)?;
    file.write_all(document.as_bytes())?;

    let (_, path) = file.keep().map_err(|e| PostError::Io(e.error))?;
    Ok(path)
}

/// Split a front-matter document back into its raw `key: value` pairs
/// and body text. The inverse of [`render_post`] up to value rendering.
pub fn parse_post(document: &str) -> Result<(Vec<(String, String)>, String), PostError> {
    let rest = document
        .strip_prefix("---\n")
        .ok_or_else(|| PostError::Malformed("missing opening delimiter".into()))?;
    let (block, after) = rest
        .split_once("---\n")
        .ok_or_else(|| PostError::Malformed("missing closing delimiter".into()))?;

    let mut pairs = Vec::new();
    for line in block.lines() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(": ")
            .or_else(|| line.split_once(':'))
            .ok_or_else(|| PostError::Malformed(format!("bad metadata line: '{}'", line)))?;
        pairs.push((key.to_string(), value.to_string()));
    }

    // The rendered form puts one blank line between block and body
    let body = after.strip_prefix('\n').unwrap_or(after);
    Ok((pairs, body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataValue;
    use tempfile::tempdir;

    fn sample_metadata() -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("title", MetadataValue::scalar("Test article"));
        metadata.insert("author", MetadataValue::scalar("Test Author"));
        metadata
    }

    #[test]
    fn test_render_post() {
        let document = render_post(&sample_metadata(), "This is a test article");
        assert_eq!(
            document,
            "---\ntitle: Test article\nauthor: Test Author\n---\n\nThis is a test article"
        );
    }

    #[test]
    fn test_render_post_empty_metadata() {
        let document = render_post(&Metadata::new(), "body only");
        assert_eq!(document, "---\n---\n\nbody only");
    }

    #[test]
    fn test_render_multi_value_line() {
        let mut metadata = Metadata::new();
        metadata.add_multi("keywords", "test");
        metadata.add_multi("keywords", "pytest");
        let document = render_post(&metadata, "Content");
        assert!(document.contains("keywords: pytest, test\n"));
    }

    #[test]
    fn test_write_post_creates_md_file() {
        let dir = tempdir().unwrap();
        let path = write_post(&sample_metadata(), "This is a test article", dir.path()).unwrap();

        assert!(path.exists() && path.is_file());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("md"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "---\ntitle: Test article\nauthor: Test Author\n---\n\nThis is a test article"
        );
    }

    #[test]
    fn test_write_post_names_do_not_collide() {
        let dir = tempdir().unwrap();
        let a = write_post(&sample_metadata(), "one", dir.path()).unwrap();
        let b = write_post(&sample_metadata(), "two", dir.path()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_write_post_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_post(&sample_metadata(), "x", &missing).unwrap_err();
        assert!(matches!(err, PostError::Io(_)));
    }

    #[test]
    fn test_round_trip() {
        let mut metadata = Metadata::new();
        metadata.insert("title", MetadataValue::scalar("My first article"));
        metadata.insert("slug", MetadataValue::scalar("my-first-article-0a1b2c3d"));
        metadata.add_multi("keywords", "test");
        metadata.add_multi("keywords", "pytest");
        metadata.insert("translation", MetadataValue::Bool(false));
        let body = "Line one.\n\nLine two.";

        let document = render_post(&metadata, body);
        let (pairs, parsed_body) = parse_post(&document).unwrap();

        assert_eq!(parsed_body, body);
        let rendered: Vec<(String, String)> = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(pairs, rendered);
    }

    #[test]
    fn test_parse_rejects_missing_delimiters() {
        assert!(parse_post("no front matter here").is_err());
        assert!(parse_post("---\ntitle: unclosed\n").is_err());
    }
}
