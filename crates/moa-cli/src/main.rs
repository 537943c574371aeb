//! MOA CLI
//!
//! Runs the API server and covers the administrator tasks that have no HTTP
//! surface: migrations, card management, notifications, token cleanup, and
//! configuration.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod config_handlers;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use moa_core::{ConfigManager, MoaConfig};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Config commands must work even when the file does not parse.
    if let Command::Config { action } = cli.command {
        init_logging("warn");
        config_handlers::handle_config_command(config_path, action)?;
        return Ok(());
    }

    let config = MoaConfig::load(config_path)?;
    init_logging(&config.logging.filter);

    match cli.command {
        Command::Serve { host, port, memory } => {
            commands::serve(config, host, port, memory).await
        }
        Command::Migrate => commands::migrate(&config).await,
        Command::Card { action } => commands::card(&config, action).await,
        Command::Notify(args) => commands::notify(&config, args).await,
        Command::Tokens { action } => commands::tokens(&config, action).await,
        Command::Config { .. } => Ok(()),
    }
}

/// `RUST_LOG` wins; otherwise `fallback`, e.g. `info` or `moa_api=debug,info`.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
