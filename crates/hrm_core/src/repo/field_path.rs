//! Dotted field-path matching over schema-less JSON documents.

use crate::model::EntityId;
use serde_json::Value;

/// Splits a dotted path, rejecting empty segments.
pub fn parse_field_path(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return None;
    }
    Some(segments)
}

/// Returns whether `value` holds `target` at `segments`.
///
/// Arrays are transparent: an array matches if any element matches the
/// remaining path.
pub fn field_matches(value: &Value, segments: &[&str], target: EntityId) -> bool {
    if let Value::Array(items) = value {
        return items
            .iter()
            .any(|item| field_matches(item, segments, target));
    }

    match segments.split_first() {
        None => value.as_i64() == Some(target),
        Some((head, rest)) => value
            .get(*head)
            .is_some_and(|child| field_matches(child, rest, target)),
    }
}
