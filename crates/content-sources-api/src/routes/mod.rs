//! API routes.

pub mod health;
pub mod openapi;
pub mod parameters;
pub mod repositories;

use crate::AppState;
use axum::Router;
use content_sources_config::RoutingConfig;

/// Build the main API router.
///
/// The versioned API is mounted under both the full (`v1.0`) and the major
/// (`v1`) root path.
pub fn router(state: AppState, routing: &RoutingConfig) -> Router {
    let mut router = Router::new().merge(health::router());

    for root in routing.root_paths() {
        tracing::debug!(root = %root, "Mounting API");
        router = router.nest(&root, api_router());
    }

    router.with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(openapi::router())
        .merge(parameters::router())
        .merge(repositories::router())
}
