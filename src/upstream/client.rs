//! `reqwest`-backed `UpstreamClient`.
//!
//! Connection pool construction follows
//! `examples/jmylchreest-m3u-proxy/crates/m3u-proxy/src/proxy/http_stream.rs`'s
//! `proxy_http_stream` (`Client::builder()` with a connect timeout and
//! `pool_max_idle_per_host`), built once at startup and held behind
//! `Arc`. Header forwarding is the exact allowlist from
//! `examples/original_source/app/services/proxy.py`'s `_prepare_headers`.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::errors::{ProxyError, ProxyResult};
use crate::models::ResourceKind;

use super::{UpstreamClient, UpstreamPage};

const DEFAULT_USER_AGENT: &str = "SCIM-Proxy/1.0.0";

/// Headers forwarded verbatim from the client request to upstream.
/// Anything else the client sent is dropped.
const FORWARDED_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "x-auth-token",
    "bearer",
    "cookie",
    "x-forwarded-for",
    "x-real-ip",
    "user-agent",
];

pub struct ReqwestUpstreamClient {
    client: Client,
    base_url: Url,
}

impl ReqwestUpstreamClient {
    pub fn new(base_url: Url, timeout: Duration, max_connections: usize) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(max_connections.min(20))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn resource_path(&self, kind: ResourceKind, id: Option<&str>) -> Url {
        let segment = match kind {
            ResourceKind::User => "Users",
            ResourceKind::Group => "Groups",
        };
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("upstream_base_url must be a base URL");
            segments.push(segment);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn build_headers(&self, incoming: &HeaderMap, has_body: bool) -> HeaderMap {
        let mut out = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            if let Some(value) = incoming.get(*name) {
                if let Ok(header_name) = HeaderName::try_from(*name) {
                    out.insert(header_name, value.clone());
                }
            }
        }
        out.entry("accept")
            .or_insert(HeaderValue::from_static("application/scim+json"));
        if has_body {
            out.entry("content-type")
                .or_insert(HeaderValue::from_static("application/scim+json"));
        }
        out.entry("user-agent")
            .or_insert(HeaderValue::from_static(DEFAULT_USER_AGENT));
        out
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: Url,
        headers: &HeaderMap,
        body: Option<Value>,
    ) -> ProxyResult<Option<Value>> {
        debug!(%method, %url, "dispatching upstream request");
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .headers(convert_headers(headers));
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "upstream request failed");
            ProxyError::from(e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProxyError::ResourceNotFound(url.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProxyError::TooManyRequests(
                "upstream reported rate limiting".into(),
            ));
        }
        if !status.is_success() {
            let mapped = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            warn!(%method, %url, %status, "upstream returned non-success status");
            return Err(ProxyError::upstream(
                mapped,
                format!("upstream returned {status}"),
            ));
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let value = response.json::<Value>().await.map_err(ProxyError::from)?;
        Ok(Some(value))
    }
}

fn convert_headers(headers: &HeaderMap) -> reqwest::header::HeaderMap {
    let mut out = reqwest::header::HeaderMap::new();
    for (name, value) in headers.iter() {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.insert(name, value);
        }
    }
    out
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn list(
        &self,
        kind: ResourceKind,
        start_index: usize,
        count: usize,
        headers: &HeaderMap,
    ) -> ProxyResult<UpstreamPage> {
        let mut url = self.resource_path(kind, None);
        url.query_pairs_mut()
            .append_pair("startIndex", &start_index.to_string())
            .append_pair("count", &count.to_string());
        let headers = self.build_headers(headers, false);
        let body = self
            .send(reqwest::Method::GET, url, &headers, None)
            .await?
            .unwrap_or(Value::Null);

        let resources = body
            .get("Resources")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let total_results = body
            .get("totalResults")
            .and_then(Value::as_u64)
            .map(|n| n as usize);

        Ok(UpstreamPage {
            resources,
            total_results,
        })
    }

    async fn get(&self, kind: ResourceKind, id: &str, headers: &HeaderMap) -> ProxyResult<Value> {
        let url = self.resource_path(kind, Some(id));
        let headers = self.build_headers(headers, false);
        self.send(reqwest::Method::GET, url, &headers, None)
            .await?
            .ok_or_else(|| ProxyError::ResourceNotFound(id.to_string()))
    }

    async fn create(
        &self,
        kind: ResourceKind,
        body: Value,
        headers: &HeaderMap,
    ) -> ProxyResult<Value> {
        let url = self.resource_path(kind, None);
        let headers = self.build_headers(headers, true);
        self.send(reqwest::Method::POST, url, &headers, Some(body))
            .await?
            .ok_or_else(|| ProxyError::upstream(StatusCode::BAD_GATEWAY, "empty create response"))
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        headers: &HeaderMap,
    ) -> ProxyResult<Value> {
        let url = self.resource_path(kind, Some(id));
        let headers = self.build_headers(headers, true);
        self.send(reqwest::Method::PUT, url, &headers, Some(body))
            .await?
            .ok_or_else(|| ProxyError::upstream(StatusCode::BAD_GATEWAY, "empty update response"))
    }

    async fn patch(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        headers: &HeaderMap,
    ) -> ProxyResult<Value> {
        let url = self.resource_path(kind, Some(id));
        let headers = self.build_headers(headers, true);
        self.send(reqwest::Method::PATCH, url, &headers, Some(body))
            .await?
            .ok_or_else(|| ProxyError::upstream(StatusCode::BAD_GATEWAY, "empty patch response"))
    }

    async fn delete(&self, kind: ResourceKind, id: &str, headers: &HeaderMap) -> ProxyResult<()> {
        let url = self.resource_path(kind, Some(id));
        let headers = self.build_headers(headers, false);
        self.send(reqwest::Method::DELETE, url, &headers, None)
            .await?;
        Ok(())
    }
}
