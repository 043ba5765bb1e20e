//! Backfill Controller (spec §4.4).
//!
//! Materializes a bounded working set from the upstream via serial
//! paging, the exact stop conditions of
//! `examples/original_source/app/services/proxy.py`'s
//! `get_all_users_for_filtering`/`get_all_groups_for_filtering`: short
//! page, upstream failure (best-effort), or `totalResults` reached.

use axum::http::HeaderMap;
use serde_json::Value;
use tracing::warn;

use crate::errors::ProxyResult;
use crate::metrics::UNDERCOUNT_COUNTER;
use crate::models::ResourceKind;
use crate::upstream::UpstreamClient;

const PAGE_SIZE: usize = 100;

pub struct BackfillResult {
    pub resources: Vec<Value>,
    /// True if the working set was capped before upstream's own data was
    /// exhausted — the filtered result may be undercounted.
    pub truncated: bool,
}

/// Compute `working_size = min(count * multiplier, max_filter_fetch_size)`.
pub fn working_size(count: usize, multiplier: usize, max_filter_fetch_size: usize) -> usize {
    count.saturating_mul(multiplier).min(max_filter_fetch_size)
}

pub async fn backfill(
    client: &dyn UpstreamClient,
    kind: ResourceKind,
    working_size: usize,
    headers: &HeaderMap,
) -> ProxyResult<BackfillResult> {
    let mut fetched: Vec<Value> = Vec::new();
    let mut cursor = 1usize;
    let mut upstream_total: Option<usize> = None;
    let mut stopped_on_failure = false;

    while fetched.len() < working_size {
        let page = match client.list(kind, cursor, PAGE_SIZE, headers).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "upstream page fetch failed during backfill; returning partial working set");
                stopped_on_failure = true;
                break;
            }
        };

        let page_len = page.resources.len();
        upstream_total = page.total_results;
        fetched.extend(page.resources);

        if page_len < PAGE_SIZE {
            break;
        }
        if let Some(total) = upstream_total {
            if fetched.len() >= total {
                break;
            }
        }
        cursor += PAGE_SIZE;
    }

    fetched.truncate(working_size);

    let truncated = !stopped_on_failure
        && fetched.len() >= working_size
        && upstream_total.map(|total| total > fetched.len()).unwrap_or(false);

    if truncated {
        warn!(
            kind = kind.as_str(),
            working_size,
            fetched = fetched.len(),
            total_upstream = ?upstream_total,
            "backfill stopped at working_size while upstream still had more data; filtered results may be undercounted"
        );
        UNDERCOUNT_COUNTER.increment();
    }

    Ok(BackfillResult {
        resources: fetched,
        truncated,
    })
}
