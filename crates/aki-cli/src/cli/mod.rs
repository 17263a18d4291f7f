//! CLI entry and dispatch.

use anyhow::{Context, Result};
use aki_core::config;
use clap::Parser;
use tracing::info;

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "aki")]
#[command(version)]
#[command(about = "Session-gated terminal lookup for Firebase-backed records")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password (password is read from stdin)
    Login {
        /// Account email
        #[arg(long, env = "AKI_EMAIL")]
        email: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show whether a user is signed in
    Status,
    /// Print the current id token
    Token {
        /// Force a refresh before printing
        #[arg(long)]
        refresh: bool,
    },
    /// Look up records by username
    Query {
        /// Exact username to match
        #[arg(value_name = "USERNAME")]
        username: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines are flushed
    let _log_guard = logging::init()?;
    info!(version = env!("CARGO_PKG_VERSION"), "aki starting");

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the file is broken
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = config::Config::load().context("load config")?;

    // default to the interactive UI
    let Some(command) = cli.command else {
        return commands::ui::run(&config).await;
    };

    match command {
        Commands::Login { email } => commands::auth::login(&config, &email).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Status => commands::auth::status(&config),
        Commands::Token { refresh } => commands::auth::token(&config, refresh).await,
        Commands::Query { username } => commands::query::run(&config, &username).await,
        Commands::Config { .. } => Ok(()),
    }
}
