//! Attribute Projector (spec §4.5).
//!
//! Top-level-only include/exclude projection, always preserving `id` and
//! `schemas`. Ported from `examples/original_source/app/routers/users.py`
//! (`_apply_attribute_filtering`/`_filter_user_attributes`).

use std::collections::HashSet;

use serde_json::Value;

const MANDATORY: [&str; 2] = ["id", "schemas"];

pub fn project(doc: &Value, include: &[String], exclude: &[String]) -> Value {
    let Some(object) = doc.as_object() else {
        return doc.clone();
    };

    if !include.is_empty() {
        let mut keep: HashSet<&str> = include.iter().map(String::as_str).collect();
        keep.extend(MANDATORY);
        let projected: serde_json::Map<String, Value> = object
            .iter()
            .filter(|(k, _)| keep.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        return Value::Object(projected);
    }

    if !exclude.is_empty() {
        let drop: HashSet<&str> = exclude
            .iter()
            .map(String::as_str)
            .filter(|k| !MANDATORY.contains(k))
            .collect();
        let projected: serde_json::Map<String, Value> = object
            .iter()
            .filter(|(k, _)| !drop.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        return Value::Object(projected);
    }

    doc.clone()
}

/// Parse a comma-separated `attributes`/`excludedAttributes` query
/// parameter into a list, trimming whitespace and dropping empty
/// segments.
pub fn parse_attribute_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
