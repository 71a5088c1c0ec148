//! Get/set primitives between tri-state attributes and documents
//!
//! Every submodule follows the same contract:
//!
//! - `get` writes `data[key]` only when the value is present. Absent and
//!   pending values leave the document untouched.
//! - `set` stores the decoded value when `data[key]` exists (and is not null)
//!   and decodes cleanly. Otherwise a pending value collapses to the type's
//!   zero value, so no attribute is left pending after a response round-trip.
//!   Values that fail to decode are reported as mismatch warnings.

pub mod list;
pub mod map;
pub mod object;
pub mod scalar;
pub mod secret;
pub mod set;

use crate::handler::Handler;
use crate::value::Document;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Non-null entry for `key`
pub(crate) fn lookup<'a>(data: &'a Document, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|value| !value.is_null())
}

pub(crate) fn encode<T: Serialize>(value: &T, key: &str) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(err) => {
            log::warn!("could not encode '{key}': {err}");
            None
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: &Value, key: &str, h: &mut Handler) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            h.mismatch(
                format!("Unexpected value for '{key}' in response"),
                err.to_string(),
            );
            None
        }
    }
}

/// Decode every element of an array, skipping (and reporting) bad ones
pub(crate) fn decode_elements<T: DeserializeOwned>(
    items: &[Value],
    key: &str,
    h: &mut Handler,
) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| decode(item, key, h))
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn wrong_shape(h: &mut Handler, key: &str, expected: &str, got: &Value) {
    h.mismatch(
        format!("Unexpected value for '{key}' in response"),
        format!("expected {expected}, got {}", json_kind(got)),
    );
}
