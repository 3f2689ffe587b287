//! Content Sources administrative CLI.

use clap::{Parser, Subcommand};
use content_sources_config::SystemConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "content-sources")]
#[command(about = "Content Sources administration", long_about = None)]
struct Cli {
    /// Path to the KDL configuration file
    #[arg(long, env = "CONTENT_SOURCES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Insert public repositories
    Seed {
        /// JSON file of `[{"base_url": "..."}]` entries
        #[arg(long)]
        file: Option<PathBuf>,
        /// Additional repository URL (repeatable)
        #[arg(long = "url")]
        urls: Vec<String>,
    },
    /// Validate the configuration and print the effective settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SystemConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Migrate => {
            commands::migrate(&config).await?;
        }
        Commands::Seed { file, urls } => {
            commands::seed::run(&config, file.as_deref(), urls).await?;
        }
        Commands::CheckConfig => {
            commands::check_config(&config);
        }
    }

    Ok(())
}
