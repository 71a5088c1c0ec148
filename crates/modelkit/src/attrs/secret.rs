//! Write-only attributes (tokens, passwords)
//!
//! The remote system accepts these but never returns them, so the configured
//! value is the only source of truth and responses are not consulted.

use super::scalar;
use crate::value::{Document, TriStateScalar};
use serde::Serialize;

pub fn get<T: Serialize>(value: &TriStateScalar<T>, data: &mut Document, key: &str) {
    scalar::get(value, data, key);
}

/// Keep the configured value; only a pending value is collapsed
pub fn set<T: Default>(value: &mut TriStateScalar<T>) {
    value.resolve_pending(|| TriStateScalar::Present(T::default()));
}
