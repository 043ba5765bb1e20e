use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use scim_proxy::config::Config;
use scim_proxy::upstream::mock::MockUpstreamClient;
use scim_proxy::upstream::UpstreamClient;
use scim_proxy::web::{create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send_request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request_builder = Request::builder().method(method).uri(uri);

    let request = if let Some(body) = body {
        request_builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        request_builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

fn user(id: &str, user_name: &str, active: bool) -> Value {
    json!({
        "id": id,
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "userName": user_name,
        "active": active,
    })
}

fn router_with_users(users: Vec<Value>) -> Router {
    let upstream: Arc<dyn UpstreamClient> = Arc::new(MockUpstreamClient::new(users, vec![]));
    let state = AppState {
        upstream,
        config: Arc::new(Config::default()),
    };
    create_router(state)
}

#[tokio::test]
async fn health_check_reports_upstream_base_url() {
    let app = router_with_users(vec![]);
    let (status, body) = send_request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("upstream_base_url").is_some());
}

#[tokio::test]
async fn filtered_list_evaluates_locally_after_backfill() {
    let users = vec![
        user("1", "alice", true),
        user("2", "bob", false),
        user("3", "carol", true),
    ];
    let app = router_with_users(users);

    let (status, body) = send_request(
        &app,
        Method::GET,
        "/v2/Users?filter=active%20eq%20true",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], 2);
    let names: Vec<&str> = body["Resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["userName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice", "carol"]);
}

#[tokio::test]
async fn complex_predicate_filter_matches_nested_array_element() {
    let mut alice = user("1", "alice", true);
    alice["emails"] = json!([
        {"type": "work", "value": "alice@work.example"},
        {"type": "home", "value": "alice@home.example"},
    ]);
    let mut bob = user("2", "bob", true);
    bob["emails"] = json!([{"type": "home", "value": "bob@home.example"}]);

    let app = router_with_users(vec![alice, bob]);

    let (status, body) = send_request(
        &app,
        Method::GET,
        "/v2/Users?filter=emails%5Btype%20eq%20%22work%22%5D",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], 1);
    assert_eq!(body["Resources"][0]["userName"], "alice");
}

#[tokio::test]
async fn invalid_filter_syntax_returns_400_without_reaching_upstream() {
    let app = router_with_users(vec![user("1", "alice", true)]);

    let (status, body) = send_request(
        &app,
        Method::GET,
        "/v2/Users?filter=active%20eq",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["scimType"], "invalidFilter");
}

#[tokio::test]
async fn attribute_projection_always_preserves_id_and_schemas() {
    let app = router_with_users(vec![user("1", "alice", true)]);

    let (status, body) = send_request(
        &app,
        Method::GET,
        "/v2/Users?attributes=userName",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let resource = &body["Resources"][0];
    assert!(resource.get("id").is_some());
    assert!(resource.get("schemas").is_some());
    assert!(resource.get("userName").is_some());
    assert!(resource.get("active").is_none());
}

#[tokio::test]
async fn patch_with_boolean_string_is_coerced_before_forwarding() {
    let app = router_with_users(vec![user("1", "alice", true)]);

    let patch_body = json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "replace", "path": "active", "value": "False"}
        ]
    });

    let (status, body) = send_request(&app, Method::PATCH, "/v2/Users/1", Some(patch_body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn patch_filtered_add_rewrites_to_replace_on_whole_collection() {
    let mut alice = user("1", "alice", true);
    alice["phoneNumbers"] = json!([{"type": "home", "value": "+1-111"}]);
    let app = router_with_users(vec![alice]);

    let patch_body = json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "add", "path": "phoneNumbers[type eq \"work\"].value", "value": "+1-555"}
        ]
    });

    let (status, body) = send_request(&app, Method::PATCH, "/v2/Users/1", Some(patch_body)).await;

    assert_eq!(status, StatusCode::OK);
    let numbers = body["phoneNumbers"].as_array().unwrap();
    assert_eq!(numbers.len(), 2);
    assert!(numbers.iter().any(|n| n["type"] == "work" && n["value"] == "+1-555"));
}

#[tokio::test]
async fn patch_without_path_or_value_is_rejected() {
    let app = router_with_users(vec![user("1", "alice", true)]);

    let patch_body = json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [{"op": "replace"}]
    });

    let (status, body) = send_request(&app, Method::PATCH, "/v2/Users/1", Some(patch_body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["scimType"], "invalidPatch");
}

#[tokio::test]
async fn get_unknown_resource_returns_404() {
    let app = router_with_users(vec![]);

    let (status, body) = send_request(&app, Method::GET, "/v2/Users/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["scimType"], "resourceNotFound");
}

#[tokio::test]
async fn root_prefix_and_v2_prefix_both_serve_the_same_routes() {
    let app = router_with_users(vec![user("1", "alice", true)]);

    let (status_v2, _) = send_request(&app, Method::GET, "/v2/Users/1", None).await;
    let (status_root, _) = send_request(&app, Method::GET, "/Users/1", None).await;

    assert_eq!(status_v2, StatusCode::OK);
    assert_eq!(status_root, StatusCode::OK);
}

#[tokio::test]
async fn service_provider_config_advertises_filter_support() {
    let app = router_with_users(vec![]);

    let (status, body) = send_request(&app, Method::GET, "/v2/ServiceProviderConfig", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filter"]["supported"], true);
    assert_eq!(body["patch"]["supported"], true);
}
