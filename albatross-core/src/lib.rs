//! # albatross-core
//!
//! Core library for the albatross content manager.
//!
//! This crate provides the data model for users, articles, and their
//! key/value metadata, plus the export pipeline that turns a user's
//! articles into front-matter documents and compiles them into a static
//! site archive via an external generator.

pub mod compiler;
pub mod config;
pub mod frontmatter;
pub mod metadata;
pub mod models;
pub mod settings;
pub mod slug;
pub mod store;

pub use compiler::{CompileOptions, CompiledSite, SiteCompiler};
pub use config::Config;
pub use frontmatter::{render_post, write_post};
pub use metadata::{assemble_metadata, Metadata, MetadataValue};
pub use models::{Article, MetadataEntry, NewArticle, User, UserSettings};
pub use settings::GeneratorSettings;
pub use slug::{slugify, SlugGenerator, SlugIndex};
pub use store::MemoryStore;
