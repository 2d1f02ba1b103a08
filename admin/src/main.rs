mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use crate::cli::Cli;
use crate::config::AdminConfig;
use hybridauth_bridge::{JsonFileStore, LoginModeConfigResolver, StaticUrlBuilder};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    // Load configuration
    let config = AdminConfig::load_for_cli(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load config file {}",
            cli.config.as_deref().unwrap_or_default()
        )
    })?;

    // Initialize logging with configured level; stdout is kept for command output
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.log_level()
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.store.path.clone().into());
    let root_url = cli
        .root_url
        .clone()
        .unwrap_or_else(|| config.store.modules_root_url.clone());

    tracing::debug!("Host configuration: {}", store_path.display());
    tracing::debug!("Modules root URL: {}", root_url);

    let resolver = LoginModeConfigResolver::new(
        JsonFileStore::new(store_path),
        StaticUrlBuilder::new(root_url),
    );

    let output = commands::run(&resolver, &cli.command)?;
    println!("{}", output.text);

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
