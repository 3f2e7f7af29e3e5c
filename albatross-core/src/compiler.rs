//! Site compilation - orchestrates serialization, the external
//! generator, and archiving.
//!
//! Flow: articles -> front-matter files in a scoped working directory ->
//! external generator run -> zip archive of the generator's output.
//! Everything is sequential within one compile; the working directory is
//! removed on every exit path.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::json;
use tempfile::{Builder, TempDir};
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::Config;
use crate::frontmatter::{write_post, PostError};
use crate::metadata::assemble_metadata;
use crate::models::{Article, User};
use crate::settings::{GeneratorSettings, SettingsError};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Post error: {0}")]
    Post(#[from] PostError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to run generator '{command}': {source}")]
    Spawn {
        command: String,
        source: io::Error,
    },

    #[error("Generator '{command}' exited with status {code:?}")]
    Generator {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Knobs for a single compile run.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Parent for the temporary working directory; system default if None
    pub temp_parent: Option<PathBuf>,

    /// Keep the expanded output directory next to the archive instead of
    /// removing it
    pub keep_output_dir: bool,
}

/// Result of a successful compile.
#[derive(Debug, Clone)]
pub struct CompiledSite {
    /// The produced archive
    pub archive: PathBuf,

    /// Where the generator wrote its expanded output (may have been
    /// removed, see [`CompileOptions::keep_output_dir`])
    pub output_dir: PathBuf,

    /// Number of serialized input documents
    pub article_count: usize,
}

/// Batch-exports a user's articles through the external generator.
pub struct SiteCompiler {
    config: Config,
    settings: GeneratorSettings,
}

impl SiteCompiler {
    pub fn new(config: Config, settings: GeneratorSettings) -> Self {
        Self { config, settings }
    }

    /// Compile `articles` into a site archive for `user`.
    ///
    /// The caller supplies an ownership-filtered batch. The output
    /// directory is derived from the canonical username, so compiles for
    /// different users never share paths; two simultaneous compiles for
    /// the SAME user do share it and can interleave - callers serialize
    /// those themselves.
    pub fn compile(
        &self,
        user: &User,
        articles: &[Article],
        opts: &CompileOptions,
    ) -> Result<CompiledSite, CompileError> {
        let workdir = self.create_workdir(opts)?;
        tracing::info!(
            "Compiling {} articles for '{}' in {:?}",
            articles.len(),
            user.username_lower,
            workdir.path()
        );

        for article in articles {
            let metadata = assemble_metadata(article, user, &self.config);
            let path = write_post(&metadata, &article.content, workdir.path())?;
            tracing::debug!("Serialized '{}' to {:?}", article.slug, path);
        }

        let output_dir = self.config.output_dir().join(&user.username_lower);
        fs::create_dir_all(&output_dir)?;

        self.run_generator(workdir.path(), &output_dir)?;

        let archive = self
            .config
            .output_dir()
            .join(format!("{}-site.zip", user.username_lower));
        archive_dir(&output_dir, &archive)?;
        tracing::info!("Archived site to {:?}", archive);

        if !opts.keep_output_dir {
            fs::remove_dir_all(&output_dir)?;
        }

        Ok(CompiledSite {
            archive,
            output_dir,
            article_count: articles.len(),
        })
        // workdir dropped here - removed whether or not we got this far
    }

    fn create_workdir(&self, opts: &CompileOptions) -> Result<TempDir, CompileError> {
        let mut builder = Builder::new();
        builder.prefix("albatross-");
        let workdir = match &opts.temp_parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(workdir)
    }

    /// Point the generator at the working directory and run it to
    /// completion. The generator is a black box: a non-zero exit is fatal
    /// and unexplained.
    fn run_generator(&self, input_dir: &Path, output_dir: &Path) -> Result<(), CompileError> {
        let mut settings = self.settings.clone();
        settings.set("PATH", json!(input_dir.to_string_lossy()));
        settings.set("OUTPUT_PATH", json!(output_dir.to_string_lossy()));
        let settings_path = settings.write(&input_dir.join(SETTINGS_FILE))?;

        let command = self.config.generator_command().to_string();
        let output = Command::new(&command)
            .arg("--settings")
            .arg(&settings_path)
            .output()
            .map_err(|source| CompileError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CompileError::Generator {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

/// Zip a directory tree into `dest`, preserving relative paths.
fn archive_dir(src: &Path, dest: &Path) -> Result<(), CompileError> {
    let file = File::create(dest)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path == src {
            continue;
        }
        let relative = path.strip_prefix(src).unwrap_or(path);
        let name = relative.to_string_lossy().into_owned();

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut reader = File::open(path)?;
            io::copy(&mut reader, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewArticle;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn fixture_user() -> User {
        let now = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        User::new(1, "Alice", "alice@example.com", now)
    }

    fn fixture_article(id: u64, title: &str, draft: bool) -> Article {
        let now = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Article::new(
            id,
            1,
            format!("{}-0a1b2c3d", crate::slugify(title)),
            NewArticle {
                title: title.into(),
                content: "Hello and welcome to my blog!".into(),
                is_draft: draft,
                ..NewArticle::default()
            },
            now,
        )
    }

    /// Config with the generator stubbed out by a command that ignores
    /// its arguments and succeeds.
    fn stub_config(root: &Path) -> Config {
        let yaml = format!(
            "paths:\n  store: albatross.json\n  output: {}\ngenerator:\n  command: \"true\"\n",
            root.join("output").display()
        );
        let path = root.join("albatross.yml");
        std::fs::write(&path, yaml).unwrap();
        Config::from_file(&path).unwrap()
    }

    #[test]
    fn test_compile_produces_archive() {
        let dir = tempdir().unwrap();
        let config = stub_config(dir.path());
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let user = fixture_user();
        let articles = vec![
            fixture_article(1, "First Article", false),
            fixture_article(2, "Second Article", false),
            fixture_article(3, "Third Article", false),
            fixture_article(4, "A Draft", true),
            fixture_article(5, "Another Draft", true),
        ];

        let site = compiler
            .compile(&user, &articles, &CompileOptions::default())
            .unwrap();

        assert_eq!(site.article_count, 5);
        assert!(site.archive.exists());
        assert_eq!(
            site.archive.file_name().and_then(|n| n.to_str()),
            Some("alice-site.zip")
        );
        // Expanded output removed by default; archive retained
        assert!(!site.output_dir.exists());
    }

    #[test]
    fn test_compile_empty_batch_still_archives() {
        let dir = tempdir().unwrap();
        let config = stub_config(dir.path());
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let site = compiler
            .compile(&fixture_user(), &[], &CompileOptions::default())
            .unwrap();

        assert_eq!(site.article_count, 0);
        assert!(site.archive.exists());
    }

    #[test]
    fn test_compile_keep_output_dir() {
        let dir = tempdir().unwrap();
        let config = stub_config(dir.path());
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let opts = CompileOptions {
            keep_output_dir: true,
            ..CompileOptions::default()
        };
        let site = compiler.compile(&fixture_user(), &[], &opts).unwrap();
        assert!(site.output_dir.exists());
        assert!(site.archive.exists());
    }

    #[test]
    fn test_workdir_cleaned_up_under_given_parent() {
        let dir = tempdir().unwrap();
        let config = stub_config(dir.path());
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let parent = dir.path().join("scratch");
        std::fs::create_dir_all(&parent).unwrap();
        let opts = CompileOptions {
            temp_parent: Some(parent.clone()),
            ..CompileOptions::default()
        };
        compiler.compile(&fixture_user(), &[], &opts).unwrap();

        // The scoped working directory is gone once compile returns
        assert_eq!(std::fs::read_dir(&parent).unwrap().count(), 0);
    }

    #[test]
    fn test_generator_failure_is_fatal_and_cleans_up() {
        let dir = tempdir().unwrap();
        let mut config = stub_config(dir.path());
        config.generator.command = "false".into();
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let parent = dir.path().join("scratch");
        std::fs::create_dir_all(&parent).unwrap();
        let opts = CompileOptions {
            temp_parent: Some(parent.clone()),
            ..CompileOptions::default()
        };

        let err = compiler
            .compile(&fixture_user(), &[fixture_article(1, "Doomed", false)], &opts)
            .unwrap_err();
        assert!(matches!(err, CompileError::Generator { .. }));

        // Cleanup still happened
        assert_eq!(std::fs::read_dir(&parent).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_generator_is_spawn_error() {
        let dir = tempdir().unwrap();
        let mut config = stub_config(dir.path());
        config.generator.command = "albatross-no-such-generator".into();
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let err = compiler
            .compile(&fixture_user(), &[], &CompileOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Spawn { .. }));
    }

    #[test]
    fn test_output_dirs_disjoint_per_user() {
        let dir = tempdir().unwrap();
        let config = stub_config(dir.path());
        let compiler = SiteCompiler::new(config, GeneratorSettings::default());

        let now = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let alice = User::new(1, "Alice", "alice@example.com", now);
        let bob = User::new(2, "Bob", "bob@example.com", now);

        let opts = CompileOptions {
            keep_output_dir: true,
            ..CompileOptions::default()
        };
        let a = compiler.compile(&alice, &[], &opts).unwrap();
        let b = compiler.compile(&bob, &[], &opts).unwrap();

        assert_ne!(a.output_dir, b.output_dir);
        assert_ne!(a.archive, b.archive);
    }
}
