pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::quotes::QuoteOptions;
use crate::core::config::{ApiCredentials, AppConfig};
use crate::core::quote::normalize_symbols;
use crate::core::QuoteFetcher;
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Quotes(QuoteOptions),
    Watch(QuoteOptions),
}

/// Loads configuration and credentials from the environment, then runs `command`.
pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    symbols: Option<Vec<String>>,
) -> Result<()> {
    info!("Tickerboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let credentials = ApiCredentials::from_env();
    debug!(?credentials, "Resolved provider credentials");

    run_with(command, &config, &credentials, symbols).await
}

pub async fn run_with(
    command: AppCommand,
    config: &AppConfig,
    credentials: &ApiCredentials,
    symbols: Option<Vec<String>>,
) -> Result<()> {
    let fetcher = QuoteFetcher::from_config(&config.providers, credentials);
    let symbols = normalize_symbols(symbols.as_deref().unwrap_or(&config.symbols));

    match command {
        AppCommand::Quotes(options) => cli::quotes::run(&fetcher, &symbols, &options).await,
        AppCommand::Watch(options) => {
            let refresh = Duration::from_secs(config.refresh_interval_secs);
            cli::watch::run(&fetcher, &symbols, refresh, &options).await
        }
    }
}
