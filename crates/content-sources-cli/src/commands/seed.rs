//! Public repository seeding.

use anyhow::{Context, Result};
use content_sources_config::SystemConfig;
use content_sources_config::external::load_external_repos;
use content_sources_db::{PgRepositoryDao, RepositoryDao, create_pool};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Save every known public URL: the config file's list, then the seed file,
/// then `--url` flags.
pub async fn run(config: &SystemConfig, file: Option<&Path>, urls: Vec<String>) -> Result<()> {
    let urls = collect_urls(config, file, urls)?;
    if urls.is_empty() {
        println!("No public repositories to seed");
        return Ok(());
    }

    let pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    let dao = PgRepositoryDao::new(pool);
    dao.save_public_repos(&urls)
        .await
        .context("Failed to save public repositories")?;

    info!(count = urls.len(), "Seeded public repositories");
    Ok(())
}

fn collect_urls(
    config: &SystemConfig,
    file: Option<&Path>,
    extra: Vec<String>,
) -> Result<Vec<String>> {
    let mut urls = config.public_repositories.clone();
    if let Some(path) = file {
        let from_file = load_external_repos(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        urls.extend(from_file);
    }
    urls.extend(extra);

    // Order kept; the store ignores repeats anyway.
    let mut seen = HashSet::new();
    urls.retain(|url| !url.trim().is_empty() && seen.insert(url.clone()));
    Ok(urls)
}
