//! Payload path helpers
//!
//! Field paths are dotted (`"meta.doc.id"`) and walk nested JSON objects.
//! A single leading `.` is accepted and ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('.').unwrap_or(path).split('.')
}

/// Resolve a dotted path inside a payload
///
/// Returns `None` when any segment is missing or an intermediate value is
/// not an object.
pub fn value_at<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(payload, |value, key| value.as_object()?.get(key))
}

/// Keep only the top-level keys addressed by `fields`
///
/// Nested paths keep their whole top-level subtree, so `value_at` on the
/// projection resolves exactly as it would on the original payload.
pub fn project(payload: &Value, fields: &[String]) -> Value {
    let Some(object) = payload.as_object() else {
        return Value::Object(Map::new());
    };

    let mut projected = Map::new();
    for field in fields {
        if let Some(root) = segments(field).next() {
            if let Some(value) = object.get(root) {
                projected.insert(root.to_string(), value.clone());
            }
        }
    }
    Value::Object(projected)
}

/// True for a missing, `null` or empty-array value
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Which part of a payload to return with a point
///
/// Deserializes from `true`/`false` or from a list of field paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WithPayload {
    Enable(bool),
    Fields(Vec<String>),
}

impl Default for WithPayload {
    fn default() -> Self {
        WithPayload::Enable(false)
    }
}

impl From<bool> for WithPayload {
    fn from(enable: bool) -> Self {
        WithPayload::Enable(enable)
    }
}

impl From<Vec<String>> for WithPayload {
    fn from(fields: Vec<String>) -> Self {
        WithPayload::Fields(fields)
    }
}

impl WithPayload {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, WithPayload::Enable(false))
    }

    /// Apply the selection to a stored payload
    pub fn apply(&self, payload: Option<&Value>) -> Option<Value> {
        match self {
            WithPayload::Enable(false) => None,
            WithPayload::Enable(true) => payload.cloned(),
            WithPayload::Fields(fields) => payload.map(|p| project(p, fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_at_nested() {
        let payload = json!({"meta": {"doc": {"id": "d1"}}, "docId": 7});
        assert_eq!(value_at(&payload, "docId"), Some(&json!(7)));
        assert_eq!(value_at(&payload, ".docId"), Some(&json!(7)));
        assert_eq!(value_at(&payload, "meta.doc.id"), Some(&json!("d1")));
        assert_eq!(value_at(&payload, "meta.missing"), None);
        assert_eq!(value_at(&payload, "docId.inner"), None);
    }

    #[test]
    fn test_project_keeps_roots() {
        let payload = json!({"docId": "a", "meta": {"lang": "en"}, "text": "long"});
        let projected = project(&payload, &["docId".to_string(), "meta.lang".to_string()]);
        assert_eq!(projected, json!({"docId": "a", "meta": {"lang": "en"}}));
    }

    #[test]
    fn test_project_non_object() {
        assert_eq!(project(&json!([1, 2]), &["a".to_string()]), json!({}));
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&json!(null))));
        assert!(is_empty(Some(&json!([]))));
        assert!(!is_empty(Some(&json!(""))));
        assert!(!is_empty(Some(&json!([1]))));
    }

    #[test]
    fn test_with_payload_selection() {
        let payload = json!({"docId": "a", "text": "body"});
        assert_eq!(WithPayload::Enable(false).apply(Some(&payload)), None);
        assert_eq!(WithPayload::Enable(true).apply(Some(&payload)), Some(payload.clone()));
        assert_eq!(
            WithPayload::Fields(vec!["docId".to_string()]).apply(Some(&payload)),
            Some(json!({"docId": "a"}))
        );
        assert_eq!(WithPayload::Enable(true).apply(None), None);
    }

    #[test]
    fn test_with_payload_deserialize() {
        let flag: WithPayload = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(flag, WithPayload::Enable(true));
        let fields: WithPayload = serde_json::from_value(json!(["docId"])).unwrap();
        assert_eq!(fields, WithPayload::Fields(vec!["docId".to_string()]));
    }
}
