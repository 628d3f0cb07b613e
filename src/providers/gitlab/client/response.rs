use log::{debug, error};
use serde_json::{Map, Value};

use super::LOG_TARGET;
use crate::error::{GitLabApiError, ResponseShape};

/// A JSON object returned verbatim by the API.
pub type JsonObject = Map<String, Value>;

const LOGGED_KEYS: usize = 5;

/// Checks that `value` is an object and unwraps it.
pub(super) fn into_object(endpoint: &str, value: Value) -> Result<JsonObject, GitLabApiError> {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().take(LOGGED_KEYS).map(String::as_str).collect();
            debug!(target: LOG_TARGET, "Response contains object with keys: {keys:?}");
            Ok(map)
        }
        other => Err(mismatch(endpoint, ResponseShape::Object, &other)),
    }
}

/// Checks that `value` is a list and unwraps it.
pub(super) fn into_list(endpoint: &str, value: Value) -> Result<Vec<Value>, GitLabApiError> {
    match value {
        Value::Array(items) => {
            debug!(target: LOG_TARGET, "Response contains {} items", items.len());
            Ok(items)
        }
        other => Err(mismatch(endpoint, ResponseShape::List, &other)),
    }
}

fn mismatch(endpoint: &str, expected: ResponseShape, value: &Value) -> GitLabApiError {
    let err = GitLabApiError::unexpected_shape(endpoint, expected, value);
    error!(target: LOG_TARGET, "{err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_passes_through_unmodified() {
        let value = json!({"id": 42, "name": "demo", "nested": {"a": [1, 2]}});
        let object = into_object("/projects/42", value.clone()).unwrap();
        assert_eq!(Value::Object(object), value);
    }

    #[test]
    fn test_object_keeps_key_order() {
        let body = r#"{"web_url":"u","id":1,"status":"success","ref":"main","sha":"abc","before_sha":"x"}"#;
        let value: Value = serde_json::from_str(body).unwrap();

        let object = into_object("/projects/1/pipelines/1", value).unwrap();

        let keys: Vec<&str> = object.keys().take(LOGGED_KEYS).map(String::as_str).collect();
        assert_eq!(keys, ["web_url", "id", "status", "ref", "sha"]);
        assert_eq!(serde_json::to_string(&object).unwrap(), body);
    }

    #[test]
    fn test_list_passes_through_unmodified() {
        let value = json!([{"id": 1}, {"id": 2}, 3]);
        let items = into_list("/projects/1/pipelines", value.clone()).unwrap();
        assert_eq!(Value::Array(items), value);
    }

    #[test]
    fn test_list_where_object_expected() {
        let err = into_object("/projects/1", json!([])).unwrap_err();
        assert!(matches!(
            err,
            GitLabApiError::UnexpectedShape {
                expected: ResponseShape::Object,
                found: "list",
                ..
            }
        ));
    }

    #[test]
    fn test_object_where_list_expected() {
        let err = into_list("/projects/1/pipelines", json!({"message": "oops"})).unwrap_err();
        assert!(err.to_string().contains("/projects/1/pipelines"));
        assert!(err.to_string().contains("expected list, got object"));
    }

    #[test]
    fn test_null_is_rejected() {
        assert!(into_object("/projects/1", Value::Null).is_err());
        assert!(into_list("/projects/1/pipelines", Value::Null).is_err());
    }
}
