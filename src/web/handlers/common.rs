//! Generic request handling shared by `/Users` and `/Groups`.
//!
//! The PATCH adapter and backfill controller are already generic over
//! `ResourceKind` (see the Open Question decision in DESIGN.md on
//! filtered PATCH for groups), so the HTTP handlers delegate to one
//! shared implementation per verb rather than duplicating the original's
//! per-resource routers.

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::Value;

use crate::backfill::{backfill, working_size};
use crate::errors::{ProxyError, ProxyResult};
use crate::filter::{evaluate, Parser};
use crate::models::{ListResponse, PatchRequest, ResourceKind};
use crate::patch::adapt_patch_for_upstream;
use crate::projector::{self, parse_attribute_list};
use crate::web::handlers::list_query::ListQuery;
use crate::web::AppState;

pub async fn list(
    state: &AppState,
    kind: ResourceKind,
    headers: &HeaderMap,
    query: ListQuery,
) -> ProxyResult<Json<ListResponse>> {
    let include = parse_attribute_list(query.attributes.as_deref());
    let exclude = parse_attribute_list(query.excluded_attributes.as_deref());

    if let Some(filter) = query.filter.as_deref() {
        let expr = Parser::new(state.config.max_filter_complexity).parse(filter)?;

        let size = working_size(
            query.count,
            state.config.filter_fetch_multiplier,
            state.config.max_filter_fetch_size,
        );
        let result = backfill(state.upstream.as_ref(), kind, size, headers).await?;

        let matched: Vec<Value> = result
            .resources
            .into_iter()
            .filter(|doc| evaluate(&expr, doc))
            .collect();

        let start = (query.start_index - 1).min(matched.len());
        let end = (start + query.count).min(matched.len());
        let page: Vec<Value> = matched[start..end]
            .iter()
            .map(|doc| projector::project(doc, &include, &exclude))
            .collect();

        return Ok(Json(ListResponse::new(matched.len(), query.start_index, page)));
    }

    let page = state
        .upstream
        .list(kind, query.start_index, query.count, headers)
        .await?;
    let resources: Vec<Value> = page
        .resources
        .iter()
        .map(|doc| projector::project(doc, &include, &exclude))
        .collect();

    Ok(Json(ListResponse {
        schemas: vec![crate::models::SCHEMA_LIST_RESPONSE.to_string()],
        total_results: page.total_results.unwrap_or(resources.len()),
        start_index: query.start_index,
        items_per_page: resources.len(),
        resources,
    }))
}

pub async fn get(
    state: &AppState,
    kind: ResourceKind,
    id: &str,
    headers: &HeaderMap,
) -> ProxyResult<Json<Value>> {
    let resource = state.upstream.get(kind, id, headers).await?;
    Ok(Json(resource))
}

pub async fn create(
    state: &AppState,
    kind: ResourceKind,
    headers: &HeaderMap,
    body: Value,
) -> ProxyResult<(StatusCode, Json<Value>)> {
    let resource = state.upstream.create(kind, body, headers).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn update(
    state: &AppState,
    kind: ResourceKind,
    id: &str,
    headers: &HeaderMap,
    body: Value,
) -> ProxyResult<Json<Value>> {
    let resource = state.upstream.update(kind, id, body, headers).await?;
    Ok(Json(resource))
}

pub async fn patch(
    state: &AppState,
    kind: ResourceKind,
    id: &str,
    headers: &HeaderMap,
    request: PatchRequest,
) -> ProxyResult<Json<Value>> {
    for (i, op) in request.operations.iter().enumerate() {
        let is_mutating = op.op.eq_ignore_ascii_case("replace") || op.op.eq_ignore_ascii_case("add");
        if is_mutating && op.value.is_none() && op.path.is_none() {
            return Err(ProxyError::InvalidPatch(format!(
                "operation {} ({}) requires either 'path' or 'value'",
                i + 1,
                op.op
            )));
        }
    }

    let adapted = adapt_patch_for_upstream(state.upstream.as_ref(), kind, id, request, headers).await;
    let body = serde_json::to_value(&adapted).map_err(|e| ProxyError::InvalidPatch(e.to_string()))?;
    let resource = state.upstream.patch(kind, id, body, headers).await?;
    Ok(Json(resource))
}

pub async fn delete(
    state: &AppState,
    kind: ResourceKind,
    id: &str,
    headers: &HeaderMap,
) -> ProxyResult<StatusCode> {
    state.upstream.delete(kind, id, headers).await?;
    Ok(StatusCode::NO_CONTENT)
}
