//! String-keyed map attributes of scalar elements

use super::{decode, encode, lookup, wrong_shape};
use crate::handler::Handler;
use crate::value::{Document, TriStateMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

pub fn get<T: Serialize>(value: &TriStateMap<T>, data: &mut Document, key: &str) {
    if let Some(entries) = value.as_present() {
        let object: Document = entries
            .iter()
            .filter_map(|(k, v)| encode(v, key).map(|json| (k.clone(), json)))
            .collect();
        data.insert(key.to_string(), Value::Object(object));
    }
}

pub fn set<T: DeserializeOwned>(
    value: &mut TriStateMap<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key) {
        Some(Value::Object(object)) => {
            let mut entries = BTreeMap::new();
            for (k, v) in object {
                if let Some(decoded) = decode(v, key, h) {
                    entries.insert(k.clone(), decoded);
                }
            }
            *value = TriStateMap::Present(entries);
        }
        Some(other) => {
            wrong_shape(h, key, "an object", other);
            value.resolve_pending(|| TriStateMap::Present(BTreeMap::new()));
        }
        None => value.resolve_pending(|| TriStateMap::Present(BTreeMap::new())),
    }
}
