//! holocast - Star Wars characters fused with their homeworld's weather
//!
//! Resolves characters from the registry, their homeworld planets, and a
//! one-day forecast for those planets, caching every origin response for
//! thirty minutes.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use holocast::aggregate::Aggregator;
use holocast::cache::{CacheAside, FileStore, KeyValueStore, MemoryStore};
use holocast::cli::{
    apply_overrides, exit_code, parse_character_id, CacheAction, Cli, CliError, Command,
    StoreChoice,
};
use holocast::config::Config;
use holocast::data::{SwapiClient, WeatherClient};
use holocast::history::HistoryLog;

/// Installs the stderr log subscriber; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "holocast=debug,info"
    } else {
        "holocast=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the file store location, falling back to the XDG cache directory
fn file_store(dir: Option<std::path::PathBuf>) -> Result<FileStore, CliError> {
    match dir {
        Some(dir) => Ok(FileStore::with_dir(dir)),
        None => FileStore::new().ok_or(CliError::NoCacheDirectory),
    }
}

/// Opens the fusion history store
fn history_store(choice: StoreChoice) -> Result<Arc<dyn KeyValueStore>, CliError> {
    let store: Arc<dyn KeyValueStore> = match choice {
        StoreChoice::Memory => Arc::new(MemoryStore::new()),
        StoreChoice::File(Some(dir)) => Arc::new(FileStore::with_dir(dir)),
        StoreChoice::File(None) => {
            Arc::new(FileStore::in_data_dir("history").ok_or(CliError::NoHistoryDirectory)?)
        }
    };
    Ok(store)
}

/// Fuses every id concurrently, records each result and prints the composites as JSON
async fn fuse(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
    history: HistoryLog,
    raw_ids: &[String],
) -> anyhow::Result<ExitCode> {
    let ids = raw_ids
        .iter()
        .map(|raw| parse_character_id(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let http = Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("failed to build HTTP client")?;

    let aggregator = Aggregator::new(
        CacheAside::new(store),
        SwapiClient::with_client(http.clone()).with_base_url(&config.swapi_base_url),
        WeatherClient::with_client(http)
            .with_base_url(&config.open_meteo_base_url)
            .with_timezone(&config.timezone),
    )
    .with_history(history);

    let results = futures::future::join_all(ids.iter().map(|id| aggregator.fuse(id))).await;

    let mut errors = Vec::new();
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(composite) => {
                let json = serde_json::to_string_pretty(&composite)
                    .context("failed to encode composite")?;
                println!("{}", json);
            }
            Err(e) => {
                match std::error::Error::source(&e) {
                    Some(cause) => eprintln!("{}: {} ({}): {}", id, e, e.status_code(), cause),
                    None => eprintln!("{}: {} ({})", id, e, e.status_code()),
                }
                errors.push(e);
            }
        }
    }

    Ok(ExitCode::from(exit_code(&errors)))
}

/// Prints one line per cache entry
async fn list_cache(store: Arc<dyn KeyValueStore>) -> anyhow::Result<ExitCode> {
    let entries = store.scan().await.context("failed to scan cache")?;
    debug!(count = entries.len(), "cache scanned");

    for entry in &entries {
        let state = if entry.is_expired() { "expired" } else { "fresh" };
        println!("{}\t{}\t{}", entry.key, entry.expires_at.to_rfc3339(), state);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::from_env().context("invalid configuration")?;
    apply_overrides(&cli, &mut config);

    let store: Arc<dyn KeyValueStore> = match StoreChoice::from_cli(&cli, &config)? {
        StoreChoice::Memory => Arc::new(MemoryStore::new()),
        StoreChoice::File(dir) => {
            let store = file_store(dir)?;
            debug!(dir = %store.cache_dir().display(), "using file cache");

            if let Command::Cache {
                action: CacheAction::Purge,
            } = cli.command
            {
                let removed = store
                    .purge_expired()
                    .await
                    .context("failed to purge cache")?;
                info!(removed, "purged expired cache entries");
                println!("removed {} expired entries", removed);
                return Ok(ExitCode::SUCCESS);
            }

            Arc::new(store)
        }
    };

    match cli.command {
        Command::Fuse { ref ids } => {
            let history = HistoryLog::new(history_store(StoreChoice::history(&cli, &config))?);
            fuse(&config, store, history, ids).await
        }
        Command::Cache { .. } => list_cache(store).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
