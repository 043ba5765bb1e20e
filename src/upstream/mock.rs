//! In-memory `UpstreamClient` fake for tests.
//!
//! No mocking crate: the teacher's own dependency table doesn't pull one
//! in either, and a hand-rolled trait-object fake is simpler than wiring
//! up expectations for a handful of methods.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde_json::Value;

use crate::errors::{ProxyError, ProxyResult};
use crate::models::ResourceKind;

use super::{UpstreamClient, UpstreamPage};

pub struct MockUpstreamClient {
    users: Mutex<Vec<Value>>,
    groups: Mutex<Vec<Value>>,
    /// Page size the fake pretends upstream enforces, so backfill tests
    /// can exercise the multi-page loop deterministically.
    pub page_cap: usize,
    pub fail_after_calls: Option<usize>,
    call_count: Mutex<usize>,
}

impl MockUpstreamClient {
    pub fn new(users: Vec<Value>, groups: Vec<Value>) -> Self {
        Self {
            users: Mutex::new(users),
            groups: Mutex::new(groups),
            page_cap: 100,
            fail_after_calls: None,
            call_count: Mutex::new(0),
        }
    }

    fn store(&self, kind: ResourceKind) -> &Mutex<Vec<Value>> {
        match kind {
            ResourceKind::User => &self.users,
            ResourceKind::Group => &self.groups,
        }
    }

    fn count_call(&self) -> ProxyResult<()> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        if let Some(limit) = self.fail_after_calls {
            if *count > limit {
                return Err(ProxyError::upstream(
                    axum::http::StatusCode::BAD_GATEWAY,
                    "simulated upstream failure",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn list(
        &self,
        kind: ResourceKind,
        start_index: usize,
        count: usize,
        _headers: &HeaderMap,
    ) -> ProxyResult<UpstreamPage> {
        self.count_call()?;
        let store = self.store(kind).lock().unwrap();
        let page_size = count.min(self.page_cap);
        let start = start_index.saturating_sub(1).min(store.len());
        let end = (start + page_size).min(store.len());
        Ok(UpstreamPage {
            resources: store[start..end].to_vec(),
            total_results: Some(store.len()),
        })
    }

    async fn get(&self, kind: ResourceKind, id: &str, _headers: &HeaderMap) -> ProxyResult<Value> {
        self.count_call()?;
        let store = self.store(kind).lock().unwrap();
        store
            .iter()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
            .ok_or_else(|| ProxyError::ResourceNotFound(id.to_string()))
    }

    async fn create(
        &self,
        kind: ResourceKind,
        body: Value,
        _headers: &HeaderMap,
    ) -> ProxyResult<Value> {
        self.count_call()?;
        let mut store = self.store(kind).lock().unwrap();
        store.push(body.clone());
        Ok(body)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        _headers: &HeaderMap,
    ) -> ProxyResult<Value> {
        self.count_call()?;
        let mut store = self.store(kind).lock().unwrap();
        let slot = store
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| ProxyError::ResourceNotFound(id.to_string()))?;
        *slot = body.clone();
        Ok(body)
    }

    async fn patch(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        _headers: &HeaderMap,
    ) -> ProxyResult<Value> {
        self.count_call()?;
        let mut store = self.store(kind).lock().unwrap();
        let slot = store
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| ProxyError::ResourceNotFound(id.to_string()))?;

        if let Some(operations) = body.get("Operations").and_then(Value::as_array) {
            for op in operations {
                let (Some(path), Some(value)) = (
                    op.get("path").and_then(Value::as_str),
                    op.get("value"),
                ) else {
                    continue;
                };
                if let Some(obj) = slot.as_object_mut() {
                    obj.insert(path.to_string(), value.clone());
                }
            }
        }
        Ok(slot.clone())
    }

    async fn delete(&self, kind: ResourceKind, id: &str, _headers: &HeaderMap) -> ProxyResult<()> {
        self.count_call()?;
        let mut store = self.store(kind).lock().unwrap();
        store.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        Ok(())
    }
}
