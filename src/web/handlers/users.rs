//! `/Users` routes. Thin: all behavior lives in `common`, parameterized
//! by `ResourceKind::User`.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::Value;

use crate::errors::ProxyResult;
use crate::models::{ListResponse, PatchRequest, ResourceKind};
use crate::web::handlers::common;
use crate::web::handlers::list_query::ListQuery;
use crate::web::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: ListQuery,
) -> ProxyResult<Json<ListResponse>> {
    common::list(&state, ResourceKind::User, &headers, query).await
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResult<Json<Value>> {
    common::get(&state, ResourceKind::User, &id, &headers).await
}

pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ProxyResult<(StatusCode, Json<Value>)> {
    common::create(&state, ResourceKind::User, &headers, body).await
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ProxyResult<Json<Value>> {
    common::update(&state, ResourceKind::User, &id, &headers, body).await
}

pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<PatchRequest>,
) -> ProxyResult<Json<Value>> {
    common::patch(&state, ResourceKind::User, &id, &headers, request).await
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResult<StatusCode> {
    common::delete(&state, ResourceKind::User, &id, &headers).await
}
