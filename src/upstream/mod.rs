//! The Upstream Client contract (spec §4.7): the entire boundary between
//! the core (filter/backfill/PATCH adapter) and the upstream SCIM
//! provider. Kept as a trait so the core can be exercised in tests
//! against an in-memory fake without a network dependency, the way the
//! teacher exposes its services as trait objects behind `AppState`.

pub mod client;
/// Not gated behind `#[cfg(test)]`: integration tests under `tests/`
/// compile as a separate crate and need this type too. It pulls in
/// nothing beyond what the rest of the crate already depends on.
pub mod mock;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde_json::Value;

use crate::errors::ProxyResult;
use crate::models::ResourceKind;

/// One page of an upstream list response: the raw resources plus
/// whatever `totalResults` upstream advertised, if any — the backfill
/// controller needs both to decide when to stop paging.
pub struct UpstreamPage {
    pub resources: Vec<Value>,
    pub total_results: Option<usize>,
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn list(
        &self,
        kind: ResourceKind,
        start_index: usize,
        count: usize,
        headers: &HeaderMap,
    ) -> ProxyResult<UpstreamPage>;

    async fn get(&self, kind: ResourceKind, id: &str, headers: &HeaderMap) -> ProxyResult<Value>;

    async fn create(
        &self,
        kind: ResourceKind,
        body: Value,
        headers: &HeaderMap,
    ) -> ProxyResult<Value>;

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        headers: &HeaderMap,
    ) -> ProxyResult<Value>;

    async fn patch(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        headers: &HeaderMap,
    ) -> ProxyResult<Value>;

    async fn delete(&self, kind: ResourceKind, id: &str, headers: &HeaderMap) -> ProxyResult<()>;
}
