//! Request body validation.
//!
//! Bodies arrive as loosely typed JSON; every required field is checked for
//! presence, type and emptiness before any processing starts.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing {field}")]
    Missing { field: String },

    #[error("{field} is not of type {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("{field} is empty")]
    Empty { field: String },

    #[error("{field} is not a valid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Invalid data")]
    InvalidBody,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// The body must be a non-empty JSON object.
pub fn require_object(body: &Value) -> ValidationResult<&Map<String, Value>> {
    match body.as_object() {
        Some(map) if !map.is_empty() => Ok(map),
        _ => Err(ValidationError::InvalidBody),
    }
}

fn field<'a>(body: &'a Value, name: &str) -> ValidationResult<&'a Value> {
    require_object(body)?
        .get(name)
        .ok_or_else(|| ValidationError::Missing {
            field: name.to_string(),
        })
}

fn wrong_type(name: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        field: name.to_string(),
        expected,
    }
}

/// A required string field, possibly empty.
pub fn require_str<'a>(body: &'a Value, name: &str) -> ValidationResult<&'a str> {
    field(body, name)?.as_str().ok_or_else(|| wrong_type(name, "str"))
}

/// A required string field that must not be blank.
pub fn require_text<'a>(body: &'a Value, name: &str) -> ValidationResult<&'a str> {
    let text = require_str(body, name)?;
    if text.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: name.to_string(),
        });
    }
    Ok(text)
}

fn as_string_list(value: &Value, name: &str) -> ValidationResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| wrong_type(name, "list"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(name, "list of str"))
        })
        .collect()
}

/// A required, non-empty list of strings.
pub fn require_list(body: &Value, name: &str) -> ValidationResult<Vec<String>> {
    let list = as_string_list(field(body, name)?, name)?;
    if list.is_empty() {
        return Err(ValidationError::Empty {
            field: name.to_string(),
        });
    }
    Ok(list)
}

/// An optional list of strings. Absent, null and empty all mean "not given".
pub fn optional_list(body: &Value, name: &str) -> ValidationResult<Option<Vec<String>>> {
    match require_object(body)?.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let list = as_string_list(value, name)?;
            Ok((!list.is_empty()).then_some(list))
        }
    }
}

pub fn optional_str<'a>(body: &'a Value, name: &str) -> ValidationResult<Option<&'a str>> {
    match require_object(body)?.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_str().map(Some).ok_or_else(|| wrong_type(name, "str")),
    }
}

/// Parse a raw request body. Anything that is not JSON is an invalid body.
pub fn parse_body(bytes: &[u8]) -> ValidationResult<Value> {
    serde_json::from_slice(bytes).map_err(|_| ValidationError::InvalidBody)
}

pub fn optional_usize(body: &Value, name: &str) -> ValidationResult<Option<usize>> {
    match require_object(body)?.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|v| Some(v as usize))
            .ok_or_else(|| wrong_type(name, "int")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_body() {
        assert_eq!(require_str(&json!(null), "text"), Err(ValidationError::InvalidBody));
        assert_eq!(require_str(&json!({}), "text"), Err(ValidationError::InvalidBody));
        assert_eq!(require_list(&json!([1, 2]), "urls"), Err(ValidationError::InvalidBody));
    }

    #[test]
    fn test_messages_name_the_field() {
        let body = json!({"input_texts": "not a list", "urls": [], "other": 1});

        assert_eq!(require_str(&body, "text").unwrap_err().to_string(), "Missing text");
        assert_eq!(
            require_list(&body, "input_texts").unwrap_err().to_string(),
            "input_texts is not of type list"
        );
        assert_eq!(require_list(&body, "urls").unwrap_err().to_string(), "urls is empty");
        assert_eq!(require_str(&body, "other").unwrap_err().to_string(), "other is not of type str");
    }

    #[test]
    fn test_list_items_must_be_strings() {
        let body = json!({"text": ["ok", 3]});
        assert_eq!(
            require_list(&body, "text").unwrap_err().to_string(),
            "text is not of type list of str"
        );
    }

    #[test]
    fn test_require_text_rejects_blank() {
        let body = json!({"text1": "  ", "text2": "fine"});
        assert!(matches!(require_text(&body, "text1"), Err(ValidationError::Empty { .. })));
        assert_eq!(require_text(&body, "text2"), Ok("fine"));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(br#"{"text": "x"}"#), Ok(json!({"text": "x"})));
        assert_eq!(parse_body(b"not json"), Err(ValidationError::InvalidBody));
        assert_eq!(parse_body(b""), Err(ValidationError::InvalidBody));
    }

    #[test]
    fn test_optional_fields() {
        let body = json!({"input_texts": ["a"], "target_texts": [], "pattern": null, "distanceThreshold": 5});

        assert_eq!(optional_list(&body, "target_texts"), Ok(None));
        assert_eq!(optional_list(&body, "missing"), Ok(None));
        assert_eq!(optional_list(&body, "input_texts"), Ok(Some(vec!["a".to_string()])));
        assert_eq!(optional_str(&body, "pattern"), Ok(None));
        assert_eq!(optional_usize(&body, "distanceThreshold"), Ok(Some(5)));
        assert!(optional_usize(&json!({"distanceThreshold": "x"}), "distanceThreshold").is_err());
    }
}
