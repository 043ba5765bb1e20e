//! `ServiceProviderConfig` and `ResourceTypes` discovery endpoints
//! (SPEC_FULL §11.1). Out of scope for the core per spec §1's "external
//! collaborators," but part of a complete SCIM-speaking service — static
//! documents with no upstream call, grounded on
//! `examples/original_source/app/routers/service_provider_config.py`.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::web::AppState;

pub async fn service_provider_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig"],
        "documentationUri": "https://tools.ietf.org/html/rfc7644",
        "patch": { "supported": true },
        "bulk": { "supported": false, "maxOperations": 0, "maxPayloadSize": 0 },
        "filter": {
            "supported": true,
            "maxResults": state.config.max_filter_fetch_size,
        },
        "changePassword": { "supported": false },
        "sort": { "supported": true },
        "etag": { "supported": false },
        "authenticationSchemes": [
            {
                "type": "httpbasic",
                "name": "HTTP Basic",
                "description": "Authentication scheme using the HTTP Basic Standard",
                "specUri": "https://tools.ietf.org/html/rfc2617",
                "documentationUri": "https://example.com/help/httpBasic.html"
            },
            {
                "type": "oauthbearertoken",
                "name": "OAuth Bearer Token",
                "description": "Authentication scheme using the OAuth Bearer Token Standard",
                "specUri": "https://tools.ietf.org/html/rfc6750",
                "documentationUri": "https://example.com/help/oauth.html"
            }
        ],
        "meta": {
            "location": "/v2/ServiceProviderConfig",
            "resourceType": "ServiceProviderConfig",
        }
    }))
}

pub async fn resource_types() -> Json<Value> {
    Json(json!([
        {
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
            "id": "User",
            "name": "User",
            "endpoint": "/Users",
            "schema": "urn:ietf:params:scim:schemas:core:2.0:User",
            "meta": { "resourceType": "ResourceType", "location": "/v2/ResourceTypes/User" }
        },
        {
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
            "id": "Group",
            "name": "Group",
            "endpoint": "/Groups",
            "schema": "urn:ietf:params:scim:schemas:core:2.0:Group",
            "meta": { "resourceType": "ResourceType", "location": "/v2/ResourceTypes/Group" }
        }
    ]))
}
