use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::GatewayError;

/// The uniform outcome shape returned to UI callers:
/// `{"success": true, ...fields}` or `{"success": false, "error": "..."}`.
///
/// Struct payloads are flattened next to `success`; any other payload is
/// nested under `data`, and `()` adds nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(String),
}

impl<T> From<Result<T, GatewayError>> for Outcome<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::Failure(e.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Failure(message) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
                map.end()
            }
            Outcome::Success(value) => {
                let value = serde_json::to_value(value).map_err(S::Error::custom)?;
                match value {
                    Value::Object(fields) => {
                        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                        map.serialize_entry("success", &true)?;
                        for (k, v) in &fields {
                            if k != "success" {
                                map.serialize_entry(k, v)?;
                            }
                        }
                        map.end()
                    }
                    Value::Null => {
                        let mut map = serializer.serialize_map(Some(1))?;
                        map.serialize_entry("success", &true)?;
                        map.end()
                    }
                    other => {
                        let mut map = serializer.serialize_map(Some(2))?;
                        map.serialize_entry("success", &true)?;
                        map.serialize_entry("data", &other)?;
                        map.end()
                    }
                }
            }
        }
    }
}
