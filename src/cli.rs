//! Command-line interface parsing for holocast
//!
//! This module handles parsing of CLI arguments using clap, validation of
//! character ids, the choice of cache backend, and the mapping from
//! aggregation outcomes to process exit codes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::config::Config;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The character id cannot address a registry character
    #[error("Invalid character id: '{0}'. Ids must be non-empty and contain no '/'")]
    InvalidId(String),

    /// No cache directory was given and none could be derived
    #[error("Could not determine a cache directory; pass --cache-dir or set HOLOCAST_CACHE_DIR")]
    NoCacheDirectory,

    /// No history directory was given and none could be derived
    #[error("Could not determine a history directory; pass --history-dir or set HOLOCAST_HISTORY_DIR")]
    NoHistoryDirectory,

    /// The in-memory store has nothing to purge across runs
    #[error("'cache purge' needs a persistent cache; drop --no-persist")]
    PurgeWithoutPersistence,
}

/// holocast - Star Wars characters fused with their homeworld's weather
#[derive(Parser, Debug)]
#[command(name = "holocast")]
#[command(about = "Fuse Star Wars characters with their homeworld and its weather")]
#[command(version)]
pub struct Cli {
    /// Directory for cached origin responses (default: XDG cache dir)
    #[arg(long, global = true, value_name = "DIR", conflicts_with = "no_persist")]
    pub cache_dir: Option<PathBuf>,

    /// Directory for the fusion history (default: XDG data dir)
    #[arg(long, global = true, value_name = "DIR", conflicts_with = "no_persist")]
    pub history_dir: Option<PathBuf>,

    /// Keep the cache and the fusion history in memory for this run only
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Base URL of the character/planet registry
    #[arg(long, global = true, value_name = "URL")]
    pub swapi_url: Option<String>,

    /// Base URL of the Open-Meteo API
    #[arg(long, global = true, value_name = "URL")]
    pub open_meteo_url: Option<String>,

    /// Timezone for forecast hours
    #[arg(long, global = true, value_name = "TZ")]
    pub timezone: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Fetch characters with their homeworld and its weather
    ///
    /// Examples:
    ///   holocast fuse 1          # Luke Skywalker, Tatooine and its forecast
    ///   holocast fuse 1 4 5      # Several characters at once
    Fuse {
        /// Registry ids of the characters
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Inspect or maintain the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// List every cached entry with its expiry
    List,
    /// Delete expired entries from the cache directory
    Purge,
}

/// Where cache entries live for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChoice {
    Memory,
    File(Option<PathBuf>),
}

impl StoreChoice {
    /// Picks the store from the parsed CLI flags and the effective configuration
    ///
    /// `File(None)` means the XDG default directory.
    pub fn from_cli(cli: &Cli, config: &Config) -> Result<Self, CliError> {
        if cli.no_persist {
            if matches!(cli.command, Command::Cache { action: CacheAction::Purge }) {
                return Err(CliError::PurgeWithoutPersistence);
            }
            return Ok(StoreChoice::Memory);
        }
        Ok(StoreChoice::File(config.cache_dir.clone()))
    }

    /// Picks the fusion history store
    ///
    /// `File(None)` means the XDG data directory.
    pub fn history(cli: &Cli, config: &Config) -> Self {
        if cli.no_persist {
            StoreChoice::Memory
        } else {
            StoreChoice::File(config.history_dir.clone())
        }
    }
}

/// Applies CLI overrides on top of the loaded configuration
pub fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(ref dir) = cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(ref dir) = cli.history_dir {
        config.history_dir = Some(dir.clone());
    }
    if let Some(ref url) = cli.swapi_url {
        config.swapi_base_url = url.clone();
    }
    if let Some(ref url) = cli.open_meteo_url {
        config.open_meteo_base_url = url.clone();
    }
    if let Some(ref timezone) = cli.timezone {
        config.timezone = timezone.clone();
    }
}

/// Validates a character id argument.
///
/// # Returns
/// * `Ok(&str)` with surrounding whitespace removed
/// * `Err(CliError::InvalidId)` if the id is empty or contains a path separator
pub fn parse_character_id(s: &str) -> Result<&str, CliError> {
    let id = s.trim();
    if id.is_empty() || id.contains('/') {
        return Err(CliError::InvalidId(s.to_string()));
    }
    Ok(id)
}

/// Exit code for a batch of aggregation outcomes
///
/// 0 when everything resolved, 1 if any backend failure occurred, otherwise
/// 2 if something was not found.
pub fn exit_code<'a, I>(errors: I) -> u8
where
    I: IntoIterator<Item = &'a AggregateError>,
{
    let mut code = 0;
    for error in errors {
        match error {
            AggregateError::History(_) => return 1,
            AggregateError::NotFound { .. } => code = 2,
        }
    }
    code
}
