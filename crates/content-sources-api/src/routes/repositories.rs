//! Repository configuration endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use content_sources_core::{
    FilterData, PaginationData, RepositoryBulkCreateResponse, RepositoryCollectionResponse,
    RepositoryRequest, RepositoryResponse,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::pagination::collection_metadata;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repositories", get(list_repositories).post(create_repository))
        .route("/repositories/", get(list_repositories).post(create_repository))
        .route("/repositories/bulk_create", post(bulk_create_repositories))
        .route("/repositories/bulk_create/", post(bulk_create_repositories))
        .route(
            "/repositories/{uuid}",
            get(fetch_repository)
                .put(full_update_repository)
                .patch(partial_update_repository)
                .delete(delete_repository),
        )
        .route(
            "/repositories/{uuid}/",
            get(fetch_repository)
                .put(full_update_repository)
                .patch(partial_update_repository)
                .delete(delete_repository),
        )
}

/// Raw list parameters. Paging values are parsed leniently: a value that is
/// not an integer is logged and replaced by its default.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    limit: Option<String>,
    offset: Option<String>,
    #[serde(flatten)]
    filters: FilterData,
}

impl ListQuery {
    fn pagination(&self) -> PaginationData {
        PaginationData::new(
            parse_number("limit", self.limit.as_deref()),
            parse_number("offset", self.offset.as_deref()),
        )
    }
}

fn parse_number(name: &str, value: Option<&str>) -> Option<i64> {
    let value = value?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(err) => {
            warn!(param = name, value, error = %err, "Failed to bind pagination");
            None
        }
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::NotFound(format!("Could not find repository with UUID {raw}")))
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        ApiError::BadRequest(format!("Error binding params: {}", rejection.body_text()))
    })
}

async fn list_repositories(
    State(state): State<AppState>,
    identity: Identity,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Json<RepositoryCollectionResponse>, ApiError> {
    let page = query.pagination();
    let (mut collection, total) = state
        .repository_dao
        .list(&identity.org_id, page, &query.filters)
        .await?;

    let (meta, links) = collection_metadata(uri.path(), page, &query.filters, total);
    collection.set_metadata(meta, links);
    Ok(Json(collection))
}

async fn create_repository(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<RepositoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RepositoryResponse>), ApiError> {
    let request = parse_body(payload)?.with_owner(identity.account_id, identity.org_id);
    let created = state.repository_dao.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn bulk_create_repositories(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<Vec<RepositoryRequest>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let requests: Vec<RepositoryRequest> = parse_body(payload)?
        .into_iter()
        .map(|r| r.with_owner(identity.account_id.clone(), identity.org_id.clone()))
        .collect();

    let result = state.repository_dao.bulk_create(requests).await?;
    let status = match result.error {
        Some(err) => ApiError::from(err).status(),
        None => StatusCode::CREATED,
    };
    let items: Vec<RepositoryBulkCreateResponse> = result.items;
    Ok((status, Json(items)).into_response())
}

async fn fetch_repository(
    State(state): State<AppState>,
    identity: Identity,
    Path(uuid): Path<String>,
) -> Result<Json<RepositoryResponse>, ApiError> {
    let uuid = parse_uuid(&uuid)?;
    let repository = state.repository_dao.fetch(&identity.org_id, uuid).await?;
    Ok(Json(repository))
}

async fn full_update_repository(
    State(state): State<AppState>,
    identity: Identity,
    Path(uuid): Path<String>,
    payload: Result<Json<RepositoryRequest>, JsonRejection>,
) -> Result<Json<RepositoryResponse>, ApiError> {
    let uuid = parse_uuid(&uuid)?;
    let mut request = parse_body(payload)?;
    request.fill_defaults();
    update(&state, &identity, uuid, request).await
}

async fn partial_update_repository(
    State(state): State<AppState>,
    identity: Identity,
    Path(uuid): Path<String>,
    payload: Result<Json<RepositoryRequest>, JsonRejection>,
) -> Result<Json<RepositoryResponse>, ApiError> {
    let uuid = parse_uuid(&uuid)?;
    let request = parse_body(payload)?;
    update(&state, &identity, uuid, request).await
}

async fn update(
    state: &AppState,
    identity: &Identity,
    uuid: Uuid,
    request: RepositoryRequest,
) -> Result<Json<RepositoryResponse>, ApiError> {
    let updated = state
        .repository_dao
        .update(&identity.org_id, uuid, request)
        .await?;
    Ok(Json(updated))
}

async fn delete_repository(
    State(state): State<AppState>,
    identity: Identity,
    Path(uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uuid = parse_uuid(&uuid)?;
    state.repository_dao.delete(&identity.org_id, uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
