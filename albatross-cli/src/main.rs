//! # albatross CLI
//!
//! Command-line interface for the albatross content manager.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "albatross")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "albatross.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new albatross project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Author and manage articles
    Article {
        #[command(subcommand)]
        command: ArticleCommands,
    },

    /// Manage per-user generator settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Compile a user's articles into a static site archive
    Compile {
        /// Owner of the articles to compile
        username: String,

        /// Parent directory for temporary storage
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// Keep the expanded output directory next to the archive
        #[arg(long)]
        keep_output_dir: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user account
    Add {
        username: String,
        email: String,

        /// Free-text profile blurb
        #[arg(long)]
        about: Option<String>,

        /// Initial password (stored as a salted hash)
        #[arg(long)]
        password: Option<String>,
    },

    /// List user accounts
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ArticleCommands {
    /// Create a new article
    New {
        /// Owning username
        username: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        /// Create as an unpublished draft
        #[arg(long)]
        draft: bool,
    },

    /// List a user's articles
    List {
        username: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one article
    Show {
        slug: String,

        /// Print the serialized front-matter document instead of fields
        #[arg(long)]
        rendered: bool,
    },

    /// Edit an article (the slug never changes)
    Edit {
        slug: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        draft: Option<bool>,
    },

    /// Delete an article
    Delete { slug: String },

    /// Attach a metadata key/value pair
    Tag {
        slug: String,
        key: String,
        value: String,
    },

    /// Detach a metadata key/value pair
    Untag {
        slug: String,
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show a user's settings document
    Show {
        username: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Set one settings key (dotted keys reach nested values)
    Set {
        username: String,
        key: String,
        value: String,
    },

    /// Overlay a JSON settings file onto the user's document
    Import { username: String, file: PathBuf },

    /// Write the user's settings document to a JSON file
    Export {
        username: String,

        /// Target directory (defaults to current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                email,
                about,
                password,
            } => commands::add_user(
                &cli.config,
                &username,
                &email,
                about.as_deref(),
                password.as_deref(),
            ),
            UserCommands::List { json } => commands::list_users(&cli.config, json),
        },
        Commands::Article { command } => match command {
            ArticleCommands::New {
                username,
                title,
                content,
                summary,
                image_url,
                draft,
            } => commands::new_article(
                &cli.config,
                &username,
                commands::NewArticleArgs {
                    title,
                    content,
                    summary,
                    image_url,
                    draft,
                },
            ),
            ArticleCommands::List { username, json } => {
                commands::list_articles(&cli.config, &username, json)
            }
            ArticleCommands::Show { slug, rendered } => {
                commands::show_article(&cli.config, &slug, rendered)
            }
            ArticleCommands::Edit {
                slug,
                title,
                content,
                summary,
                image_url,
                draft,
            } => commands::edit_article(
                &cli.config,
                &slug,
                commands::EditArticleArgs {
                    title,
                    content,
                    summary,
                    image_url,
                    draft,
                },
            ),
            ArticleCommands::Delete { slug } => commands::delete_article(&cli.config, &slug),
            ArticleCommands::Tag { slug, key, value } => {
                commands::tag_article(&cli.config, &slug, &key, &value)
            }
            ArticleCommands::Untag { slug, key, value } => {
                commands::untag_article(&cli.config, &slug, &key, &value)
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show { username, json } => {
                commands::show_settings(&cli.config, &username, json)
            }
            SettingsCommands::Set {
                username,
                key,
                value,
            } => commands::set_setting(&cli.config, &username, &key, &value),
            SettingsCommands::Import { username, file } => {
                commands::import_settings(&cli.config, &username, &file)
            }
            SettingsCommands::Export { username, output } => {
                commands::export_settings(&cli.config, &username, output.as_deref())
            }
        },
        Commands::Compile {
            username,
            temp_dir,
            keep_output_dir,
        } => commands::compile_site(&cli.config, &username, temp_dir, keep_output_dir),
    }
}
