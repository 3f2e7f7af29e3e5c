//! Slug generation and normalization.

use deunicode::deunicode;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

/// Width of the random hex suffix appended to every slug.
const SUFFIX_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum SlugError {
    #[error("could not allocate unique slug for '{title}' after {attempts} attempts")]
    Exhausted { title: String, attempts: usize },
}

/// Read-only view over the slugs already persisted. The generator only
/// ever queries it; the caller is responsible for inserting the returned
/// slug before releasing whatever guards the store.
pub trait SlugIndex {
    fn contains(&self, slug: &str) -> bool;
}

static HYPHEN_RUN_REGEX: OnceLock<Regex> = OnceLock::new();

fn hyphen_run_regex() -> &'static Regex {
    HYPHEN_RUN_REGEX.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Transliterate to ASCII
/// - Lowercase
/// - Replace runs of non-alphanumeric characters with single hyphens
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use albatross_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// assert_eq!(slugify("Café au lait"), "cafe-au-lait");
/// ```
pub fn slugify(input: &str) -> String {
    // Transliterate to ASCII, then lowercase
    let lowercased = deunicode(input).to_lowercase();

    // Replace anything that isn't alphanumeric with a hyphen
    let hyphenated = lowercased
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>();

    // Collapse multiple hyphens
    let collapsed = hyphen_run_regex().replace_all(&hyphenated, "-");

    // Trim hyphens from start and end
    collapsed.trim_matches('-').to_string()
}

/// Allocates slugs that are unique among persisted articles.
///
/// A slug is `{slugified-title}-{8 hex chars}`; the random suffix makes
/// collisions unlikely, and any remaining collision is resolved by
/// appending single random hex characters until the slug is free. A title
/// that slugifies to nothing (empty or symbol-only) falls back to the
/// random suffix alone.
#[derive(Debug, Clone)]
pub struct SlugGenerator {
    max_retries: usize,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self { max_retries: 16 }
    }
}

impl SlugGenerator {
    pub fn new(max_retries: usize) -> Self {
        Self { max_retries }
    }

    /// Generate a slug for `title` that is not present in `index`.
    ///
    /// Uniqueness holds at the moment of the check; callers must persist
    /// the slug before accepting further inserts.
    pub fn generate(&self, title: &str, index: &dyn SlugIndex) -> Result<String, SlugError> {
        let base = slugify(title);
        let suffix = random_suffix();

        let mut candidate = if base.is_empty() {
            suffix
        } else {
            format!("{}-{}", base, suffix)
        };

        let mut attempts = 0;
        while index.contains(&candidate) {
            if attempts >= self.max_retries {
                return Err(SlugError::Exhausted {
                    title: title.to_string(),
                    attempts,
                });
            }
            candidate.push(random_hex_char());
            attempts += 1;
        }

        Ok(candidate)
    }
}

fn random_suffix() -> String {
    let token = Uuid::new_v4().simple().to_string();
    token[..SUFFIX_LEN].to_string()
}

fn random_hex_char() -> char {
    let token = Uuid::new_v4().simple().to_string();
    token.chars().next().unwrap_or('0')
}
