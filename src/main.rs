use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use xdg::BaseDirectories;

use coddoc::api::ApiClient;
use coddoc::app::App;
use coddoc::config::{Config, ConfigOverrides};
use coddoc::headless::{self, SubmitOptions};
use coddoc::init;
use coddoc::language::{DocStyle, Language};

const DEFAULT_LOG_FILTER: &str = "coddoc=info";

#[derive(Parser, Debug)]
#[command(name = "coddoc")]
#[command(about = "AI-powered code review and documentation in the terminal")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides CODDOC_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// LLM provider id (overrides CODDOC_LLM_PROVIDER and the config file)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Config file to use instead of ~/.config/coddoc/config.toml
    #[arg(long, env = "CODDOC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Open the TUI with this file loaded
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Language of --file (detected from the extension by default)
    #[arg(short, long)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review a source file
    Analyze {
        path: PathBuf,
        /// Programming language (auto-detected if not specified)
        #[arg(short, long)]
        language: Option<Language>,
        /// Save the JSON response to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate documentation for a source file
    Document {
        path: PathBuf,
        #[arg(short, long)]
        language: Option<Language>,
        /// Docstring style (google, numpy, sphinx, jsdoc, javadoc)
        #[arg(short, long, default_value_t = DocStyle::Google)]
        style: DocStyle,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored reviews
    History {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Items per page (defaults to page_limit from the config)
        #[arg(long)]
        limit: Option<u32>,
        /// Only reviews in this language
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Show one stored review
    Review {
        review_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a stored review
    Delete { review_id: String },
    /// List the LLM providers offered by the backend
    Providers,
    /// Check that the backend is reachable
    Health,
    /// Show the resolved configuration
    Config,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Command::Init { force }) = &args.command {
        init_stderr_logging();
        return init::run_init(*force);
    }

    let overrides = ConfigOverrides {
        config_file: args.config.clone(),
        api_url: args.api_url.clone(),
        provider: args.provider.clone(),
    };
    let config = Config::load(&overrides)?;
    let client = ApiClient::from_config(&config).context("Invalid API configuration")?;

    let Some(command) = args.command else {
        init_file_logging();
        return run_tui(config, client, args.file, args.language).await;
    };

    init_stderr_logging();
    match command {
        Command::Analyze {
            path,
            language,
            output,
        } => {
            let options = SubmitOptions {
                path,
                language,
                provider: args.provider,
                output,
            };
            headless::run_analyze(&client, &config, &options).await
        }
        Command::Document {
            path,
            language,
            style,
            output,
        } => {
            let options = SubmitOptions {
                path,
                language,
                provider: args.provider,
                output,
            };
            headless::run_document(&client, &config, &options, style).await
        }
        Command::History {
            page,
            limit,
            language,
        } => {
            let limit = limit.unwrap_or(config.page_limit);
            headless::run_history(&client, page, limit, language.as_deref()).await
        }
        Command::Review { review_id, output } => {
            headless::run_review(&client, &review_id, output.as_deref()).await
        }
        Command::Delete { review_id } => headless::run_delete(&client, &review_id).await,
        Command::Providers => headless::run_providers(&client).await,
        Command::Health => headless::run_health(&client).await,
        Command::Config => {
            headless::run_config(&config, &client);
            Ok(())
        }
        Command::Init { .. } => Ok(()),
    }
}

async fn run_tui(
    config: Config,
    client: ApiClient,
    file: Option<PathBuf>,
    language: Option<Language>,
) -> Result<()> {
    let mut app = App::new(Arc::new(config), client);
    if let Some(path) = file {
        app.load_file(&path)?;
    }
    if let Some(language) = language {
        app.form.language = language;
    }
    tracing::info!(api_url = %app.client().base_url(), "starting TUI");
    app.run().await
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so logs go to `$XDG_CACHE_HOME/coddoc/coddoc.log`.
fn init_file_logging() {
    let file = BaseDirectories::with_prefix("coddoc")
        .ok()
        .and_then(|dirs| dirs.place_cache_file("coddoc.log").ok())
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());
    let Some(file) = file else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
