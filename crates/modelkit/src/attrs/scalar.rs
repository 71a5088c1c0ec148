//! Scalar attributes (strings, booleans, numbers)

use super::{decode, encode, lookup};
use crate::handler::Handler;
use crate::value::{Document, TriStateScalar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

pub fn get<T: Serialize>(value: &TriStateScalar<T>, data: &mut Document, key: &str) {
    if let Some(present) = value.as_present()
        && let Some(json) = encode(present, key)
    {
        data.insert(key.to_string(), json);
    }
}

pub fn set<T: DeserializeOwned + Default>(
    value: &mut TriStateScalar<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key).and_then(|json| decode(json, key, h)) {
        Some(decoded) => *value = TriStateScalar::Present(decoded),
        None => value.resolve_pending(|| TriStateScalar::Present(T::default())),
    }
}

/// Like [`set`], but warns when the response disagrees with a known value
///
/// Used for attributes the remote system is expected to echo unchanged. The
/// response value is still adopted.
pub fn set_checked<T: DeserializeOwned + Default + PartialEq + Debug>(
    value: &mut TriStateScalar<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    let Some(decoded) = lookup(data, key).and_then(|json| decode::<T>(json, key, h)) else {
        value.resolve_pending(|| TriStateScalar::Present(T::default()));
        return;
    };
    if let Some(known) = value.as_present()
        && *known != decoded
    {
        h.mismatch(
            format!("Value of '{key}' changed on the remote side"),
            format!("configured {known:?}, received {decoded:?}"),
        );
    }
    *value = TriStateScalar::Present(decoded);
}
