//! Group key extraction
//!
//! A point's group is derived from one payload field. Scalars are used
//! as-is; for arrays only the first element counts, so a point tagged
//! `["valid_3", "unused"]` belongs to group `valid_3` and nowhere else.
//! Anything else (missing, `null`, empty arrays, objects, floats) puts the
//! point in no group. Extraction never fails.

use serde_json::Value;
use vgroup_core::payload;

/// Canonical group identity
///
/// Ordered booleans first, then integers, then strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Bool(bool),
    Integer(i64),
    String(String),
}

impl GroupKey {
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(GroupKey::Bool(*b)),
            Value::Number(n) => n.as_i64().map(GroupKey::Integer),
            Value::String(s) => Some(GroupKey::String(s.clone())),
            _ => None,
        }
    }

    /// JSON rendering used for `group_id`
    pub fn to_value(&self) -> Value {
        match self {
            GroupKey::Bool(b) => Value::Bool(*b),
            GroupKey::Integer(i) => Value::from(*i),
            GroupKey::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::String(s.to_string())
    }
}

impl From<i64> for GroupKey {
    fn from(i: i64) -> Self {
        GroupKey::Integer(i)
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Bool(b) => write!(f, "{}", b),
            GroupKey::Integer(i) => write!(f, "{}", i),
            GroupKey::String(s) => write!(f, "{}", s),
        }
    }
}

/// Derive the group key of a payload for the field at `path`
pub fn extract(payload: Option<&Value>, path: &str) -> Option<GroupKey> {
    match payload::value_at(payload?, path)? {
        Value::Array(items) => items.first().and_then(GroupKey::from_scalar),
        value => GroupKey::from_scalar(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(payload: Value, path: &str) -> Option<GroupKey> {
        extract(Some(&payload), path)
    }

    #[test]
    fn test_scalar_keys() {
        assert_eq!(key(json!({"docId": "doc_1"}), "docId"), Some(GroupKey::from("doc_1")));
        assert_eq!(key(json!({"docId": 7}), "docId"), Some(GroupKey::Integer(7)));
        assert_eq!(key(json!({"docId": -3}), "docId"), Some(GroupKey::Integer(-3)));
        assert_eq!(key(json!({"flag": true}), "flag"), Some(GroupKey::Bool(true)));
    }

    #[test]
    fn test_array_uses_first_element_only() {
        let payload = json!({"compoundId": ["valid_3", "unused"]});
        assert_eq!(key(payload, "compoundId"), Some(GroupKey::from("valid_3")));
        assert_eq!(key(json!({"tags": [4, 5]}), "tags"), Some(GroupKey::Integer(4)));
    }

    #[test]
    fn test_absent_values_have_no_key() {
        assert_eq!(key(json!({}), "docId"), None);
        assert_eq!(key(json!({"docId": null}), "docId"), None);
        assert_eq!(key(json!({"docId": []}), "docId"), None);
        assert_eq!(extract(None, "docId"), None);
    }

    #[test]
    fn test_unsupported_values_have_no_key() {
        assert_eq!(key(json!({"docId": {"a": 1}}), "docId"), None);
        assert_eq!(key(json!({"docId": 1.5}), "docId"), None);
        assert_eq!(key(json!({"docId": [{"a": 1}, "x"]}), "docId"), None);
        assert_eq!(key(json!({"docId": [["x"]]}), "docId"), None);
        assert_eq!(key(json!({"docId": [null, "x"]}), "docId"), None);
    }

    #[test]
    fn test_nested_path() {
        let payload = json!({"meta": {"doc": ["d9", "d1"]}});
        assert_eq!(key(payload, "meta.doc"), Some(GroupKey::from("d9")));
    }

    #[test]
    fn test_key_ordering_and_rendering() {
        let mut keys = vec![
            GroupKey::from("b"),
            GroupKey::Integer(2),
            GroupKey::Bool(true),
            GroupKey::from("a"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                GroupKey::Bool(true),
                GroupKey::Integer(2),
                GroupKey::from("a"),
                GroupKey::from("b"),
            ]
        );
        assert_eq!(GroupKey::Integer(2).to_value(), json!(2));
        assert_eq!(GroupKey::from("a").to_value(), json!("a"));
    }
}
