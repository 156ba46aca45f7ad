use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;

use crate::cli::Command;

/// Little Lemon - terminal front-end for the restaurant API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend base URL
    #[arg(
        short = 'u',
        long,
        env = "LITTLELEMON_API_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub api_url: String,

    /// Path to the SQLite file holding the access/refresh tokens
    #[arg(long, env = "LITTLELEMON_TOKEN_DB", global = true)]
    pub token_db: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "300", global = true)]
    pub http_timeout: u64,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Backend
    pub api_url: String,

    // Credential storage
    pub token_db: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Query cache
    pub cache_ttl: u64,

    // Output
    pub log_level: String,
    pub json_output: bool,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    pub fn from_args(args: CliArgs) -> Result<(Self, Command)> {
        let token_db = match args.token_db {
            Some(path) => expand_tilde(&path),
            None => default_token_db()
                .context("Could not determine a data directory; set LITTLELEMON_TOKEN_DB")?,
        };

        let config = Config {
            api_url: args.api_url.trim_end_matches('/').to_string(),
            token_db,

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            http_request_timeout: args.http_timeout,

            cache_ttl: std::env::var("CACHE_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            log_level: args.log_level,
            json_output: args.json,
        };

        Ok((config, args.command))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .with_context(|| format!("LITTLELEMON_API_URL is not a valid URL: {}", self.api_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "LITTLELEMON_API_URL must use http or https, got {}",
                url.scheme()
            );
        }

        Ok(())
    }
}

/// Default token database: `<data dir>/littlelemon/tokens.sqlite3`
fn default_token_db() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("littlelemon").join("tokens.sqlite3"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
