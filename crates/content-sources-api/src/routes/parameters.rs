//! Distribution versions and architectures a configuration may use.

use axum::routing::get;
use axum::{Json, Router};
use content_sources_core::RepositoryParameterResponse;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/repository_parameters", get(list_parameters))
        .route("/repository_parameters/", get(list_parameters))
}

async fn list_parameters() -> Json<RepositoryParameterResponse> {
    Json(RepositoryParameterResponse::catalogue())
}
