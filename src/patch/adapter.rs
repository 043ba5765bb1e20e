//! PATCH Adapter (spec §4.6).
//!
//! Rewrites client PATCH bodies with path predicates into upstream's
//! only supported form: plain `replace`-on-whole-collection. Ported
//! line-for-line from `examples/original_source/app/routers/users.py`'s
//! `_adapt_patch_for_upstream` (grouping by base path, `field eq literal`
//! predicate parsing, found/not-found element construction).

use axum::http::HeaderMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{PatchOperation, PatchRequest, ResourceKind, PATCH_OP_SCHEMA_TYPO, SCHEMA_PATCH_OP};
use crate::upstream::UpstreamClient;

/// Apply schema correction (§4.6a) and operation normalization (§4.6b),
/// and rewrite filtered `add` operations via read-modify-write (§4.6c).
pub async fn adapt_patch_for_upstream(
    client: &dyn UpstreamClient,
    kind: ResourceKind,
    resource_id: &str,
    request: PatchRequest,
    headers: &HeaderMap,
) -> PatchRequest {
    let mut adapted = Vec::new();
    let mut filtered_adds: Vec<PatchOperation> = Vec::new();

    for op in request.operations {
        if op.op.eq_ignore_ascii_case("add")
            && op
                .path
                .as_deref()
                .map(|p| p.contains('[') && p.contains(']'))
                .unwrap_or(false)
        {
            filtered_adds.push(op);
        } else {
            adapted.push(normalize_operation(op));
        }
    }

    if !filtered_adds.is_empty() {
        match client.get(kind, resource_id, headers).await {
            Ok(current) => {
                let rewritten = rewrite_filtered_adds(&current, filtered_adds);
                adapted.extend(rewritten);
            }
            Err(err) => {
                warn!(
                    resource_id,
                    error = %err,
                    "failed to fetch current resource for filtered add rewrite; dropping add operations with filtering"
                );
            }
        }
    }

    let schemas = correct_schemas(request.schemas);

    PatchRequest {
        schemas,
        operations: adapted,
    }
}

fn correct_schemas(schemas: Vec<String>) -> Vec<String> {
    schemas
        .into_iter()
        .map(|s| {
            if s.contains(PATCH_OP_SCHEMA_TYPO) {
                s.replace(PATCH_OP_SCHEMA_TYPO, SCHEMA_PATCH_OP)
            } else {
                s
            }
        })
        .collect()
}

fn normalize_operation(op: PatchOperation) -> PatchOperation {
    PatchOperation {
        op: op.op.to_ascii_lowercase(),
        path: op.path,
        value: op.value.map(coerce_boolean_string),
    }
}

fn coerce_boolean_string(value: Value) -> Value {
    match value {
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s),
        },
        other => other,
    }
}

struct PredicateTarget {
    base_path: String,
    field: String,
    literal: String,
    sub_attr: Option<String>,
}

/// Parse `phoneNumbers[type eq "work"].value` into its components.
/// Returns `None` if the predicate isn't the single supported
/// `field eq literal` form.
fn parse_filtered_path(path: &str) -> Option<PredicateTarget> {
    let base_path = path.split('[').next()?.to_string();
    let after_bracket = path.split_once('[')?.1;
    let filter_part = after_bracket.split(']').next()?;
    let sub_attr = path
        .split_once("].")
        .map(|(_, rest)| rest.to_string());

    let (field, literal) = filter_part.split_once(" eq ")?;
    let field = field.trim().to_string();
    let literal = literal.trim().trim_matches(|c| c == '"' || c == '\'').to_string();

    Some(PredicateTarget {
        base_path,
        field,
        literal,
        sub_attr,
    })
}

fn rewrite_filtered_adds(current: &Value, ops: Vec<PatchOperation>) -> Vec<PatchOperation> {
    let mut by_base_path: Vec<(String, Vec<PatchOperation>)> = Vec::new();

    for op in ops {
        let Some(path) = op.path.clone() else { continue };
        let base_path = path.split('[').next().unwrap_or(&path).to_string();
        match by_base_path.iter_mut().find(|(p, _)| *p == base_path) {
            Some((_, group)) => group.push(op),
            None => by_base_path.push((base_path, vec![op])),
        }
    }

    let mut result = Vec::new();

    for (base_path, group) in by_base_path {
        let mut working: Vec<Value> = current
            .get(&base_path)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut group_failed = false;

        for op in group {
            let Some(path) = op.path.as_deref() else { continue };
            let Some(target) = parse_filtered_path(path) else {
                warn!(
                    path,
                    base_path, "unsupported filtered add predicate; dropping the whole group"
                );
                group_failed = true;
                continue;
            };
            let value = op.value.unwrap_or(Value::Null);
            apply_predicate_add(&mut working, &target, value);
        }

        if group_failed {
            continue;
        }

        result.push(PatchOperation {
            op: "replace".to_string(),
            path: Some(base_path),
            value: Some(Value::Array(working)),
        });
    }

    result
}

fn apply_predicate_add(working: &mut Vec<Value>, target: &PredicateTarget, value: Value) {
    let existing = working.iter_mut().find(|item| {
        item.as_object()
            .and_then(|o| o.get(&target.field))
            .and_then(Value::as_str)
            .map(|v| v == target.literal)
            .unwrap_or(false)
    });

    match existing {
        Some(item) => {
            if let Some(sub_attr) = &target.sub_attr {
                if let Some(obj) = item.as_object_mut() {
                    obj.insert(sub_attr.clone(), value);
                }
            } else if let Value::Object(incoming) = &value {
                if let Some(obj) = item.as_object_mut() {
                    for (k, v) in incoming {
                        obj.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        None => {
            let mut new_item = Map::new();
            new_item.insert(target.field.clone(), Value::String(target.literal.clone()));
            if let Some(sub_attr) = &target.sub_attr {
                new_item.insert(sub_attr.clone(), value);
            } else if let Value::Object(incoming) = &value {
                for (k, v) in incoming {
                    new_item.insert(k.clone(), v.clone());
                }
            } else {
                new_item.insert("value".to_string(), value);
            }
            working.push(Value::Object(new_item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::mock::MockUpstreamClient;
    use serde_json::json;

    fn patch_request(op: &str, path: Option<&str>, value: Option<Value>) -> PatchRequest {
        PatchRequest {
            schemas: vec![SCHEMA_PATCH_OP.to_string()],
            operations: vec![PatchOperation {
                op: op.to_string(),
                path: path.map(str::to_string),
                value,
            }],
        }
    }

    #[tokio::test]
    async fn boolean_string_coercion() {
        let client = MockUpstreamClient::new(vec![json!({"id": "1", "active": true})], vec![]);
        let request = patch_request("replace", Some("active"), Some(Value::String("False".into())));
        let adapted = adapt_patch_for_upstream(&client, ResourceKind::User, "1", request, &HeaderMap::new()).await;
        assert_eq!(adapted.operations[0].value, Some(Value::Bool(false)));
    }

    #[tokio::test]
    async fn schema_typo_is_corrected() {
        let client = MockUpstreamClient::new(vec![json!({"id": "1"})], vec![]);
        let request = PatchRequest {
            schemas: vec![PATCH_OP_SCHEMA_TYPO.to_string()],
            operations: vec![],
        };
        let adapted = adapt_patch_for_upstream(&client, ResourceKind::User, "1", request, &HeaderMap::new()).await;
        assert_eq!(adapted.schemas, vec![SCHEMA_PATCH_OP.to_string()]);
    }

    #[tokio::test]
    async fn schema_correction_is_idempotent() {
        let client = MockUpstreamClient::new(vec![json!({"id": "1"})], vec![]);
        let request = PatchRequest {
            schemas: vec![PATCH_OP_SCHEMA_TYPO.to_string()],
            operations: vec![],
        };
        let once = adapt_patch_for_upstream(&client, ResourceKind::User, "1", request, &HeaderMap::new()).await;
        let twice = adapt_patch_for_upstream(&client, ResourceKind::User, "1", once.clone(), &HeaderMap::new()).await;
        assert_eq!(once.schemas, twice.schemas);
    }

    #[tokio::test]
    async fn filtered_add_rewrites_to_replace_on_whole_array() {
        let client = MockUpstreamClient::new(
            vec![json!({
                "id": "1",
                "phoneNumbers": [{"type": "home", "value": "+1-111"}]
            })],
            vec![],
        );
        let request = patch_request(
            "add",
            Some(r#"phoneNumbers[type eq "work"].value"#),
            Some(Value::String("+1-555".into())),
        );
        let adapted = adapt_patch_for_upstream(&client, ResourceKind::User, "1", request, &HeaderMap::new()).await;

        assert_eq!(adapted.operations.len(), 1);
        let op = &adapted.operations[0];
        assert_eq!(op.op, "replace");
        assert_eq!(op.path.as_deref(), Some("phoneNumbers"));
        let arr = op.value.as_ref().unwrap().as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[1]["type"], "work");
        assert_eq!(arr[1]["value"], "+1-555");
    }

    #[tokio::test]
    async fn filtered_add_is_idempotent_when_element_already_present() {
        let client = MockUpstreamClient::new(
            vec![json!({
                "id": "1",
                "phoneNumbers": [{"type": "work", "value": "+1-555"}]
            })],
            vec![],
        );
        let request = patch_request(
            "add",
            Some(r#"phoneNumbers[type eq "work"].value"#),
            Some(Value::String("+1-555".into())),
        );
        let adapted = adapt_patch_for_upstream(&client, ResourceKind::User, "1", request, &HeaderMap::new()).await;
        let arr = adapted.operations[0].value.as_ref().unwrap().as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["value"], "+1-555");
    }

    #[tokio::test]
    async fn fetch_failure_drops_filtered_add_group_with_warning() {
        let client = MockUpstreamClient::new(vec![], vec![]);
        let request = patch_request(
            "add",
            Some(r#"phoneNumbers[type eq "work"].value"#),
            Some(Value::String("+1-555".into())),
        );
        let adapted = adapt_patch_for_upstream(&client, ResourceKind::User, "missing", request, &HeaderMap::new()).await;
        assert!(adapted.operations.is_empty());
    }

    #[tokio::test]
    async fn unparseable_predicate_drops_the_whole_group_not_just_the_op() {
        let client = MockUpstreamClient::new(
            vec![json!({
                "id": "1",
                "phoneNumbers": [{"type": "home", "value": "+1-111"}]
            })],
            vec![],
        );
        let request = PatchRequest {
            schemas: vec![SCHEMA_PATCH_OP.to_string()],
            operations: vec![
                PatchOperation {
                    op: "add".to_string(),
                    path: Some(r#"phoneNumbers[type eq "work"].value"#.to_string()),
                    value: Some(Value::String("+1-555".into())),
                },
                PatchOperation {
                    op: "add".to_string(),
                    path: Some("phoneNumbers[unsupported predicate]".to_string()),
                    value: Some(Value::String("+1-999".into())),
                },
            ],
        };
        let adapted = adapt_patch_for_upstream(&client, ResourceKind::User, "1", request, &HeaderMap::new()).await;
        assert!(
            adapted.operations.is_empty(),
            "a group with any unparseable op must be dropped entirely, not partially rewritten"
        );
    }
}
