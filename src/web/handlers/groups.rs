//! `/Groups` routes. Thin: all behavior lives in `common`, parameterized
//! by `ResourceKind::Group`. The original implementation duplicated the
//! user-PATCH rewrite logic for groups (spec §9 open question); this
//! crate shares one implementation across both resource kinds instead.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::Value;

use crate::errors::ProxyResult;
use crate::models::{ListResponse, PatchRequest, ResourceKind};
use crate::web::handlers::common;
use crate::web::handlers::list_query::ListQuery;
use crate::web::AppState;

pub async fn list_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: ListQuery,
) -> ProxyResult<Json<ListResponse>> {
    common::list(&state, ResourceKind::Group, &headers, query).await
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResult<Json<Value>> {
    common::get(&state, ResourceKind::Group, &id, &headers).await
}

pub async fn create_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ProxyResult<(StatusCode, Json<Value>)> {
    common::create(&state, ResourceKind::Group, &headers, body).await
}

pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ProxyResult<Json<Value>> {
    common::update(&state, ResourceKind::Group, &id, &headers, body).await
}

pub async fn patch_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<PatchRequest>,
) -> ProxyResult<Json<Value>> {
    common::patch(&state, ResourceKind::Group, &id, &headers, request).await
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResult<StatusCode> {
    common::delete(&state, ResourceKind::Group, &id, &headers).await
}
