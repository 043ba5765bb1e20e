//! Health check (SPEC_FULL §11.3), grounded on
//! `examples/original_source/app/routers/health.py`.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::metrics::UNDERCOUNT_COUNTER;
use crate::web::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "scim-proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream_base_url": state.config.upstream_base_url,
        "filter_undercount_total": UNDERCOUNT_COUNTER.get(),
    }))
}
