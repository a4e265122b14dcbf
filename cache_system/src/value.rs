//! Values accepted by the cache facade
//!
//! A value is either a string stored verbatim or a JSON structure stored as
//! its serialized text. Reads decode stored text back into JSON.

use crate::errors::CacheError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Stored as-is, never re-encoded
    Raw(String),
    /// Stored as JSON text
    Json(Value),
}

impl CacheValue {
    /// Build a JSON value from anything serializable
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, CacheError> {
        Ok(CacheValue::Json(serde_json::to_value(value)?))
    }

    /// Whether this value may be written to the store.
    ///
    /// Strings are always accepted. JSON values must be object-like: an
    /// object, an array or null. Bare scalars are rejected.
    pub fn is_storable(&self) -> bool {
        match self {
            CacheValue::Raw(_) => true,
            CacheValue::Json(value) => {
                matches!(value, Value::Object(_) | Value::Array(_) | Value::Null)
            }
        }
    }

    /// Text written to the store
    pub fn encode(&self) -> Result<String, CacheError> {
        match self {
            CacheValue::Raw(s) => Ok(s.clone()),
            CacheValue::Json(value) => Ok(serde_json::to_string(value)?),
        }
    }
}

/// Parse stored text as JSON
pub fn decode(raw: &str) -> Result<Value, CacheError> {
    Ok(serde_json::from_str(raw)?)
}

/// Parse stored text into a typed value
pub fn decode_as<T: DeserializeOwned>(raw: &str) -> Result<T, CacheError> {
    Ok(serde_json::from_str(raw)?)
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Raw(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Raw(value.to_string())
    }
}

impl From<&String> for CacheValue {
    fn from(value: &String) -> Self {
        CacheValue::Raw(value.clone())
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        CacheValue::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Session {
        user: String,
        hits: u32,
    }

    #[test]
    fn test_raw_strings_are_stored_verbatim() {
        let value = CacheValue::from("hihi");
        assert_eq!(value.encode().unwrap(), "hihi");

        // A JSON-looking string is still raw text
        let value = CacheValue::from(r#"{"ok":1}"#.to_string());
        assert_eq!(value.encode().unwrap(), r#"{"ok":1}"#);
    }

    #[test]
    fn test_json_values_are_serialized() {
        let value = CacheValue::from(json!({"ok": 1}));
        assert_eq!(value.encode().unwrap(), r#"{"ok":1}"#);

        let value = CacheValue::from(json!([1, "two", null]));
        assert_eq!(value.encode().unwrap(), r#"[1,"two",null]"#);
    }

    #[test]
    fn test_storable_values() {
        assert!(CacheValue::from("").is_storable());
        assert!(CacheValue::from(json!({})).is_storable());
        assert!(CacheValue::from(json!([])).is_storable());
        assert!(CacheValue::from(Value::Null).is_storable());

        assert!(!CacheValue::from(json!(1)).is_storable());
        assert!(!CacheValue::from(json!(true)).is_storable());
        assert!(!CacheValue::from(json!("text")).is_storable());
    }

    #[test]
    fn test_typed_round_trip() {
        let session = Session {
            user: "ada".to_string(),
            hits: 3,
        };
        let value = CacheValue::json(&session).unwrap();
        let text = value.encode().unwrap();
        let back: Session = decode_as(&text).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        assert!(matches!(decode("hihi"), Err(CacheError::Serialization(_))));
        assert_eq!(decode("\"hihi\"").unwrap(), json!("hihi"));
    }
}
