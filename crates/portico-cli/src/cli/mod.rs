//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use portico_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "portico")]
#[command(version = "0.3")]
#[command(about = "Terminal client for the Portico identity provider")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in through the hosted identity provider
    Login,
    /// End the session and open the provider's logout page
    Logout,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Validate the PORTICO_* environment and print the derived endpoints
    Check,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login => commands::auth::login().await,
        Commands::Logout => commands::auth::logout(),
        Commands::Config { command } => match command {
            ConfigCommands::Check => commands::config::check(),
        },
    }
}
