//! Content Sources API Server

use content_sources_api::{AppState, routes};
use content_sources_config::SystemConfig;
use content_sources_db::create_pool;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = SystemConfig::load(None)?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database connected");

    let state = AppState::from_pool(pool);

    let app = routes::router(state, &config.routing)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = config.server.listen.parse()?;
    for root in config.routing.root_paths() {
        info!(root = %root, "Serving API");
    }
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
