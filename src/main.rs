use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use littlelemon_client::auth::{CredentialStore, SqliteStore};
use littlelemon_client::cache::QueryCache;
use littlelemon_client::config::Config;
use littlelemon_client::{cli, ApiClient, ApiError, LemonApi};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let (config, command) = Config::load()?;
    config.validate()?;

    // Logs go to stderr so command output on stdout stays clean
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::debug!(
        api_url = %config.api_url,
        token_db = %config.token_db.display(),
        "Configuration loaded"
    );

    let store: Arc<dyn CredentialStore> = Arc::new(SqliteStore::open(&config.token_db)?);
    let client = ApiClient::new(
        &config.api_url,
        store,
        config.http_connect_timeout,
        config.http_request_timeout,
    )?;
    let api = LemonApi::new(client, QueryCache::new(Duration::from_secs(config.cache_ttl)));

    if let Err(e) = cli::run(&api, command, config.json_output).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_err) if api_err.is_unauthorized() => {
                eprintln!("Not logged in or session expired. Run `littlelemon login <username>`.");
            }
            Some(ApiError::Forbidden(_)) => {
                eprintln!("This command is only available to managers.");
            }
            _ => {}
        }
        return Err(e);
    }

    Ok(())
}
