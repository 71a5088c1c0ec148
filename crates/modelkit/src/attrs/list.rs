//! Ordered list attributes of scalar elements

use super::{decode_elements, encode, lookup, wrong_shape};
use crate::handler::Handler;
use crate::value::{Document, TriStateList};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn get<T: Serialize>(value: &TriStateList<T>, data: &mut Document, key: &str) {
    if let Some(items) = value.as_present() {
        let array = items.iter().filter_map(|item| encode(item, key)).collect();
        data.insert(key.to_string(), Value::Array(array));
    }
}

pub fn set<T: DeserializeOwned>(
    value: &mut TriStateList<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key) {
        Some(Value::Array(items)) => {
            *value = TriStateList::Present(decode_elements(items, key, h));
        }
        Some(other) => {
            wrong_shape(h, key, "a list", other);
            value.resolve_pending(|| TriStateList::Present(Vec::new()));
        }
        None => value.resolve_pending(|| TriStateList::Present(Vec::new())),
    }
}
