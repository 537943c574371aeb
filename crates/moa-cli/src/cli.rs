//! Command-line definitions for the `moa` binary.

use clap::{Args, Parser, Subcommand};

use moa_core::CardId;

/// MOA - activity archive API server and administration tool
#[derive(Parser, Debug)]
#[command(name = "moa", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (falls back to MOA_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
        /// Keep all data in memory instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },
    /// Apply database migrations
    Migrate,
    /// Manage activity cards
    Card {
        #[command(subcommand)]
        action: CardAction,
    },
    /// Send a notification to a user
    Notify(NotifyArgs),
    /// Refresh token maintenance
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CardAction {
    /// Create a card
    Create {
        #[arg(long)]
        qr_code: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        activity_type: String,
        /// Activity content as a JSON object
        #[arg(long, default_value = "{}")]
        activity_data: String,
        #[arg(long)]
        thumbnail_url: Option<String>,
        /// Create the card hidden from users
        #[arg(long)]
        inactive: bool,
    },
    /// List cards, newest first
    List {
        #[arg(long)]
        activity_type: Option<String>,
        /// Only active (true) or inactive (false) cards
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        skip: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show one card with its activity and share totals
    Show { id: CardId },
    /// Change card fields
    Update {
        id: CardId,
        #[command(flatten)]
        changes: CardUpdateArgs,
    },
    /// Hide a card from users
    Deactivate { id: CardId },
    /// Delete a card with its activities and shares
    Delete { id: CardId },
}

#[derive(Args, Debug, Default)]
pub struct CardUpdateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub activity_type: Option<String>,
    /// Activity content as a JSON object
    #[arg(long)]
    pub activity_data: Option<String>,
    #[arg(long)]
    pub thumbnail_url: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// Login id of the recipient
    #[arg(long)]
    pub user: String,
    /// Notification type, e.g. `system` or `share`
    #[arg(long, default_value = "system")]
    pub kind: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub message: String,
    #[arg(long)]
    pub link: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Delete refresh tokens past their expiry
    Cleanup,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `server.port`
    Get { key: String },
    /// Set a value by dotted key in the config file
    Set { key: String, value: String },
    /// Write a default config file
    Init {
        /// Target file (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=value` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from(["moa", "serve", "--port", "9000", "--memory"]).unwrap();
        match cli.command {
            Command::Serve { host, port, memory } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
                assert!(memory);
            }
            other => unreachable!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_card_update() {
        let id = CardId::new();
        let cli = Cli::try_parse_from([
            "moa",
            "card",
            "update",
            &id.to_string(),
            "--title",
            "New title",
            "--active",
            "false",
        ])
        .unwrap();
        match cli.command {
            Command::Card {
                action: CardAction::Update { id: parsed, changes },
            } => {
                assert_eq!(parsed, id);
                assert_eq!(changes.title.as_deref(), Some("New title"));
                assert_eq!(changes.active, Some(false));
            }
            other => unreachable!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_card_id_must_be_uuid() {
        assert!(Cli::try_parse_from(["moa", "card", "show", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["moa", "config", "path", "--config", "/tmp/moa.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/moa.toml"));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }
}
