//! Unordered set attributes of scalar elements
//!
//! Sets are sorted and de-duplicated on the way out and on the way in, so the
//! order the operator or the remote system used never shows up as a change.

use super::{decode_elements, encode, lookup, wrong_shape};
use crate::handler::Handler;
use crate::value::{Document, TriStateSet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn get<T: Serialize + Ord>(value: &TriStateSet<T>, data: &mut Document, key: &str) {
    if let Some(items) = value.as_present() {
        let mut sorted: Vec<&T> = items.iter().collect();
        sorted.sort();
        sorted.dedup();
        let array = sorted
            .into_iter()
            .filter_map(|item| encode(item, key))
            .collect();
        data.insert(key.to_string(), Value::Array(array));
    }
}

pub fn set<T: DeserializeOwned + Ord>(
    value: &mut TriStateSet<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key) {
        Some(Value::Array(items)) => {
            let mut decoded = decode_elements(items, key, h);
            decoded.sort();
            decoded.dedup();
            *value = TriStateSet::Present(decoded);
        }
        Some(other) => {
            wrong_shape(h, key, "a list", other);
            value.resolve_pending(|| TriStateSet::Present(Vec::new()));
        }
        None => value.resolve_pending(|| TriStateSet::Present(Vec::new())),
    }
}

/// Sort and de-duplicate a set in place
pub fn normalize<T: Ord>(value: &mut TriStateSet<T>) {
    if let Some(items) = value.as_present_mut() {
        items.sort();
        items.dedup();
    }
}

/// Whether the set contains `item`
pub fn contains<T: PartialEq>(value: &TriStateSet<T>, item: &T) -> bool {
    value.as_present().is_some_and(|items| items.contains(item))
}
