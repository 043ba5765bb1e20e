//! SCIM wire types.
//!
//! Resources are represented as untyped JSON rather than typed structs:
//! the evaluator, projector, and PATCH adapter all need to walk arbitrary
//! attribute paths including extension-URN-keyed blocks the core never
//! needs to understand, so a typed struct would either require a
//! catch-all flattened map anyway or silently drop unknown fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_USER: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const SCHEMA_GROUP: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
pub const SCHEMA_LIST_RESPONSE: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";
pub const SCHEMA_PATCH_OP: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
pub const SCHEMA_ERROR: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// The erroneous schema URN the upstream is known to emit, and its fix.
///
/// The stray space before "2.0" is the exact typo observed in practice;
/// the adapter corrects it on the way through (spec §4.6a).
pub const PATCH_OP_SCHEMA_TYPO: &str = "urn:ietf:params:scim:api:messages: 2.0:PatchOp";

/// `{schemas, totalResults, startIndex, itemsPerPage, Resources}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub schemas: Vec<String>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    #[serde(rename = "startIndex")]
    pub start_index: usize,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: usize,
    #[serde(rename = "Resources")]
    pub resources: Vec<Value>,
}

impl ListResponse {
    pub fn new(
        total_results: usize,
        start_index: usize,
        resources: Vec<Value>,
    ) -> Self {
        Self {
            schemas: vec![SCHEMA_LIST_RESPONSE.to_string()],
            total_results,
            start_index,
            items_per_page: resources.len(),
            resources,
        }
    }
}

/// A single PATCH operation, as received from the client or emitted to
/// upstream. `value` is left untyped: it may be a scalar, an object, or
/// (for filtered `add`) carry the predicate-target's replacement shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

/// The SCIM error body, `{schemas, status, scimType?, detail}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimError {
    pub schemas: Vec<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "scimType")]
    pub scim_type: Option<String>,
    pub detail: String,
}

impl ScimError {
    pub fn new(status: u16, scim_type: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            schemas: vec![SCHEMA_ERROR.to_string()],
            status: status.to_string(),
            scim_type: scim_type.map(str::to_string),
            detail: detail.into(),
        }
    }
}

/// Which SCIM resource kind a request targets — threads through the
/// backfill controller and PATCH adapter so both can stay generic over
/// Users and Groups instead of duplicating the logic per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Group,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::User => "User",
            ResourceKind::Group => "Group",
        }
    }
}
