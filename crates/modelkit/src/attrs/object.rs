//! Nested model attributes
//!
//! A nested model's own absence is represented at the parent level: an absent
//! object writes nothing, while a present object with only absent fields
//! writes an empty document. Collections of models compose the same way.

use super::{lookup, wrong_shape};
use crate::diag::Diagnostics;
use crate::handler::Handler;
use crate::model::{self, Model};
use crate::value::{Document, TriStateList, TriStateMap, TriStateObject};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn get<T: Model>(value: &TriStateObject<T>, data: &mut Document, key: &str, h: &mut Handler) {
    if let Some(node) = value.as_present() {
        data.insert(key.to_string(), Value::Object(node.values(h)));
    }
}

/// Populate a nested model from a response object
///
/// When the response has no usable object the node keeps its known values,
/// but its pending fields still collapse.
pub fn set<T: Model + Default>(
    value: &mut TriStateObject<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key) {
        Some(Value::Object(object)) => match value.as_present_mut() {
            Some(node) => node.set_values(h, object),
            None => {
                let mut node = T::default();
                node.set_values(h, object);
                *value = TriStateObject::Present(node);
            }
        },
        Some(other) => {
            wrong_shape(h, key, "an object", other);
            settle(value, h);
        }
        None => settle(value, h),
    }
}

pub fn get_list<T: Model>(
    value: &TriStateList<T>,
    data: &mut Document,
    key: &str,
    h: &mut Handler,
) {
    if let Some(nodes) = value.as_present() {
        let array = nodes
            .iter()
            .map(|node| Value::Object(node.values(h)))
            .collect();
        data.insert(key.to_string(), Value::Array(array));
    }
}

/// Populate a list of models from a response array
///
/// Response elements are merged positionally into the existing elements, so
/// values the remote system never echoes (secrets, name-based pointers) are
/// kept. Extra response elements become new models; missing ones are dropped.
/// A malformed element keeps its position and the existing model there.
pub fn set_list<T: Model + Default>(
    value: &mut TriStateList<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key) {
        Some(Value::Array(items)) => {
            let mut existing = std::mem::take(value)
                .into_present()
                .unwrap_or_default()
                .into_iter();
            let mut merged = Vec::with_capacity(items.len());
            for item in items {
                let node = existing.next();
                let Value::Object(object) = item else {
                    wrong_shape(h, key, "a list of objects", item);
                    if let Some(mut node) = node {
                        collapse(&mut node, h);
                        merged.push(node);
                    }
                    continue;
                };
                let mut node = node.unwrap_or_default();
                node.set_values(h, object);
                merged.push(node);
            }
            *value = TriStateList::Present(merged);
        }
        Some(other) => {
            wrong_shape(h, key, "a list", other);
            settle_list(value, h);
        }
        None => settle_list(value, h),
    }
}

/// Like [`get_list`], but elements are written in a canonical order
pub fn get_set<T: Model>(value: &TriStateList<T>, data: &mut Document, key: &str, h: &mut Handler) {
    if let Some(nodes) = value.as_present() {
        let mut keyed: Vec<(String, Value)> = nodes
            .iter()
            .map(|node| {
                let object = Value::Object(node.values(h));
                (object.to_string(), object)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        let array = keyed.into_iter().map(|(_, object)| object).collect();
        data.insert(key.to_string(), Value::Array(array));
    }
}

/// Populate a set of models written by [`get_set`]
///
/// The existing elements are first put in the order [`get_set`] wrote them,
/// so each response element merges into the model it was serialized from.
pub fn set_set<T: Model + Default>(
    value: &mut TriStateList<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    if let Some(nodes) = value.as_present_mut() {
        // ordering must not record diagnostics twice
        let mut scratch = Handler {
            diags: Diagnostics::new(),
            refs: h.refs.clone(),
        };
        let mut keyed: Vec<(String, T)> = std::mem::take(nodes)
            .into_iter()
            .map(|node| (Value::Object(node.values(&mut scratch)).to_string(), node))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        *nodes = keyed.into_iter().map(|(_, node)| node).collect();
    }
    set_list(value, data, key, h);
}

pub fn get_map<T: Model>(value: &TriStateMap<T>, data: &mut Document, key: &str, h: &mut Handler) {
    if let Some(nodes) = value.as_present() {
        let object: Document = nodes
            .iter()
            .map(|(k, node)| (k.clone(), Value::Object(node.values(h))))
            .collect();
        data.insert(key.to_string(), Value::Object(object));
    }
}

pub fn set_map<T: Model + Default>(
    value: &mut TriStateMap<T>,
    data: &Document,
    key: &str,
    h: &mut Handler,
) {
    match lookup(data, key) {
        Some(Value::Object(object)) => {
            let mut existing = std::mem::take(value).into_present().unwrap_or_default();
            let mut merged = BTreeMap::new();
            for (k, item) in object {
                let node = existing.remove(k);
                let Value::Object(entry) = item else {
                    wrong_shape(h, key, "a map of objects", item);
                    if let Some(mut node) = node {
                        collapse(&mut node, h);
                        merged.insert(k.clone(), node);
                    }
                    continue;
                };
                let mut node = node.unwrap_or_default();
                node.set_values(h, entry);
                merged.insert(k.clone(), node);
            }
            *value = TriStateMap::Present(merged);
        }
        Some(other) => {
            wrong_shape(h, key, "an object", other);
            settle_map(value, h);
        }
        None => settle_map(value, h),
    }
}

/// Resolve the pending fields of a model the response said nothing about
fn collapse<T: Model>(node: &mut T, h: &mut Handler) {
    node.set_values(h, &Document::new());
}

fn settle<T: Model>(value: &mut TriStateObject<T>, h: &mut Handler) {
    match value.as_present_mut() {
        Some(node) => collapse(node, h),
        None => value.resolve_pending(|| TriStateObject::Absent),
    }
}

fn settle_list<T: Model>(value: &mut TriStateList<T>, h: &mut Handler) {
    match value.as_present_mut() {
        Some(nodes) => nodes.iter_mut().for_each(|node| collapse(node, h)),
        None => value.resolve_pending(|| TriStateList::Present(Vec::new())),
    }
}

fn settle_map<T: Model>(value: &mut TriStateMap<T>, h: &mut Handler) {
    match value.as_present_mut() {
        Some(nodes) => nodes.values_mut().for_each(|node| collapse(node, h)),
        None => value.resolve_pending(|| TriStateMap::Present(BTreeMap::new())),
    }
}

pub fn validate<T: Model>(value: &TriStateObject<T>, h: &mut Handler) {
    if let Some(node) = value.as_present() {
        model::validate(node, h);
    }
}

pub fn validate_list<T: Model>(value: &TriStateList<T>, h: &mut Handler) {
    for node in value.as_present().into_iter().flatten() {
        model::validate(node, h);
    }
}

pub fn collect<T: Model>(value: &TriStateObject<T>, h: &mut Handler) {
    if let Some(node) = value.as_present() {
        model::collect_references(node, h);
    }
}

pub fn collect_list<T: Model>(value: &TriStateList<T>, h: &mut Handler) {
    for node in value.as_present().into_iter().flatten() {
        model::collect_references(node, h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{scalar, secret};
    use crate::diag::DiagnosticKind;
    use crate::model::Validator;
    use crate::value::{StringValue, TriState};
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Endpoint {
        host: StringValue,
        token: StringValue,
    }

    impl Model for Endpoint {
        fn values(&self, _h: &mut Handler) -> Document {
            let mut data = Document::new();
            scalar::get(&self.host, &mut data, "host");
            secret::get(&self.token, &mut data, "token");
            data
        }

        fn set_values(&mut self, h: &mut Handler, data: &Document) {
            scalar::set(&mut self.host, data, "host", h);
            secret::set(&mut self.token);
        }

        fn validator(&self) -> Option<&dyn Validator> {
            Some(self)
        }
    }

    impl Validator for Endpoint {
        fn validate(&self, h: &mut Handler) {
            if self.host.is_absent() {
                h.missing("endpoint host is required", "");
            }
        }
    }

    fn endpoint(host: &str) -> Endpoint {
        Endpoint {
            host: host.into(),
            token: StringValue::Absent,
        }
    }

    #[test]
    fn test_absent_object_vs_empty_object() {
        let mut h = Handler::new();
        let mut data = Document::new();
        get(&TriStateObject::<Endpoint>::Absent, &mut data, "absent", &mut h);
        get(&TriState::Present(Endpoint::default()), &mut data, "empty", &mut h);
        assert_eq!(data.get("absent"), None);
        assert_eq!(data["empty"], json!({}));
    }

    #[test]
    fn test_set_pending_object_becomes_absent() {
        let mut h = Handler::new();
        let mut value: TriStateObject<Endpoint> = TriState::Pending;
        set(&mut value, &Document::new(), "endpoint", &mut h);
        assert!(value.is_absent());
    }

    #[test]
    fn test_set_list_keeps_unechoed_fields() {
        let mut h = Handler::new();
        let mut value = TriState::Present(vec![Endpoint {
            host: "a".into(),
            token: "t1".into(),
        }]);
        let response = json!({"endpoints": [{"host": "a2"}, {"host": "b"}]});
        set_list(&mut value, response.as_object().unwrap(), "endpoints", &mut h);

        let nodes = value.into_present().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].host, StringValue::from("a2"));
        assert_eq!(nodes[0].token, StringValue::from("t1"));
        assert_eq!(nodes[1].host, StringValue::from("b"));
        assert!(nodes[1].token.is_absent());
    }

    #[test]
    fn test_get_set_is_order_independent() {
        let mut h = Handler::new();
        let mut first = Document::new();
        let mut second = Document::new();
        get_set(
            &TriState::Present(vec![endpoint("b"), endpoint("a")]),
            &mut first,
            "endpoints",
            &mut h,
        );
        get_set(
            &TriState::Present(vec![endpoint("a"), endpoint("b")]),
            &mut second,
            "endpoints",
            &mut h,
        );
        assert_eq!(first, second);
        assert_eq!(first["endpoints"], json!([{"host": "a"}, {"host": "b"}]));
    }

    #[test]
    fn test_missing_object_collapses_pending_children() {
        let mut h = Handler::new();
        let mut value = TriState::Present(Endpoint {
            host: StringValue::Pending,
            token: "t1".into(),
        });
        set(&mut value, &Document::new(), "endpoint", &mut h);

        let node = value.into_present().unwrap();
        assert_eq!(node.host, StringValue::from(""));
        assert_eq!(node.token, StringValue::from("t1"));
    }

    #[test]
    fn test_missing_list_collapses_pending_children() {
        let mut h = Handler::new();
        let mut value = TriState::Present(vec![Endpoint {
            host: StringValue::Pending,
            token: StringValue::Absent,
        }]);
        let response = json!({"endpoints": "oops"});
        set_list(&mut value, response.as_object().unwrap(), "endpoints", &mut h);

        let nodes = value.into_present().unwrap();
        assert_eq!(nodes[0].host, StringValue::from(""));
        assert_eq!(h.diags.count_of(DiagnosticKind::Mismatch), 1);
    }

    #[test]
    fn test_malformed_element_keeps_alignment() {
        let mut h = Handler::new();
        let mut value = TriState::Present(vec![
            Endpoint {
                host: "a".into(),
                token: "ta".into(),
            },
            Endpoint {
                host: "b".into(),
                token: "tb".into(),
            },
        ]);
        let response = json!({"endpoints": [1, {"host": "b2"}]});
        set_list(&mut value, response.as_object().unwrap(), "endpoints", &mut h);

        let nodes = value.into_present().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].token, StringValue::from("ta"));
        assert_eq!(nodes[1].host, StringValue::from("b2"));
        assert_eq!(nodes[1].token, StringValue::from("tb"));
    }

    #[test]
    fn test_set_set_merges_into_serialized_element() {
        let mut h = Handler::new();
        let mut value = TriState::Present(vec![
            Endpoint {
                host: "b".into(),
                token: "tb".into(),
            },
            Endpoint {
                host: "a".into(),
                token: "ta".into(),
            },
        ]);
        let mut request = Document::new();
        get_set(&value, &mut request, "endpoints", &mut h);
        assert_eq!(
            request["endpoints"],
            json!([{"host": "a", "token": "ta"}, {"host": "b", "token": "tb"}])
        );

        let response = json!({"endpoints": [{"host": "a"}, {"host": "b"}]});
        set_set(&mut value, response.as_object().unwrap(), "endpoints", &mut h);

        let nodes = value.into_present().unwrap();
        assert_eq!(nodes[0].host, StringValue::from("a"));
        assert_eq!(nodes[0].token, StringValue::from("ta"));
        assert_eq!(nodes[1].host, StringValue::from("b"));
        assert_eq!(nodes[1].token, StringValue::from("tb"));
        assert!(h.diags.is_empty());
    }

    #[test]
    fn test_map_round_trip() {
        let mut h = Handler::new();
        let value: TriStateMap<Endpoint> =
            TriState::Present(BTreeMap::from([("primary".to_string(), endpoint("p"))]));
        let mut data = Document::new();
        get_map(&value, &mut data, "endpoints", &mut h);
        assert_eq!(data["endpoints"], json!({"primary": {"host": "p"}}));

        let mut decoded: TriStateMap<Endpoint> = TriState::Absent;
        set_map(&mut decoded, &data, "endpoints", &mut h);
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_validate_list_visits_every_element() {
        let mut h = Handler::new();
        let value = TriState::Present(vec![Endpoint::default(), Endpoint::default()]);
        validate_list(&value, &mut h);
        assert_eq!(h.diags.errors().count(), 2);
    }
}
