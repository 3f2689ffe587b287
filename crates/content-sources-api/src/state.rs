//! Application state.

use content_sources_db::{PgRepositoryDao, RepositoryDao};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repository_dao: Arc<dyn RepositoryDao>,
}

impl AppState {
    pub fn new(repository_dao: Arc<dyn RepositoryDao>) -> Self {
        Self { repository_dao }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(Arc::new(PgRepositoryDao::new(pool)))
    }
}
