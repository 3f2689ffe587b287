//! Liveness endpoint.

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/ping", get(ping))
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
