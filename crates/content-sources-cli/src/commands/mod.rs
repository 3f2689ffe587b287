//! CLI command implementations.

pub mod seed;

use anyhow::{Context, Result};
use content_sources_config::SystemConfig;
use content_sources_db::{create_pool, run_migrations};
use tracing::info;

pub async fn migrate(config: &SystemConfig) -> Result<()> {
    let pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply migrations")?;
    info!("Migrations applied");
    Ok(())
}

pub fn check_config(config: &SystemConfig) {
    println!("Configuration is valid");
    println!("  listen:              {}", config.server.listen);
    println!("  max connections:     {}", config.database.max_connections);
    for root in config.routing.root_paths() {
        println!("  api root:            {root}");
    }
    println!(
        "  public repositories: {}",
        config.public_repositories.len()
    );
}
