//! List query parameter extraction & validation (spec §6).
//!
//! A custom `FromRequestParts` extractor in the style of the teacher's
//! `web/extractors.rs` (`PaginationParams`/`ListParams`): parse with
//! `serde` defaults, then validate bounds before the handler ever sees
//! the request.

use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::errors::ProxyError;

#[derive(Debug, Deserialize)]
struct RawListQuery {
    filter: Option<String>,
    attributes: Option<String>,
    #[serde(rename = "excludedAttributes")]
    excluded_attributes: Option<String>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    sort_order: Option<String>,
    #[serde(rename = "startIndex")]
    start_index: Option<usize>,
    count: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub attributes: Option<String>,
    pub excluded_attributes: Option<String>,
    /// Accepted and threaded through to upstream, never honored locally
    /// (spec §9 open question — sort support).
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub start_index: usize,
    pub count: usize,
}

impl TryFrom<RawListQuery> for ListQuery {
    type Error = ProxyError;

    fn try_from(raw: RawListQuery) -> Result<Self, Self::Error> {
        let start_index = raw.start_index.unwrap_or(1);
        if start_index < 1 {
            return Err(ProxyError::InvalidFilter(
                "startIndex must be >= 1".to_string(),
            ));
        }

        let count = raw.count.unwrap_or(100);
        if !(1..=1000).contains(&count) {
            return Err(ProxyError::InvalidFilter(
                "count must be between 1 and 1000".to_string(),
            ));
        }

        Ok(ListQuery {
            filter: raw.filter,
            attributes: raw.attributes,
            excluded_attributes: raw.excluded_attributes,
            sort_by: raw.sort_by,
            sort_order: raw.sort_order,
            start_index,
            count,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawListQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ProxyError::InvalidFilter(format!("invalid query parameters: {e}")))?;
        ListQuery::try_from(raw)
    }
}
