//! Sending request documents to the management API
//!
//! Only an in-process loopback exists: it behaves like the remote system
//! closely enough to exercise a full apply (identifier assignment, deferred
//! key rewriting, write-only secrets) without a network.

use anyhow::{Result, bail};
use modelkit::Document;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static DEFERRED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_]+:[a-z_]*:\d+$").expect("deferred key pattern is valid")
});

/// Delivers a request document and returns the response document
pub trait Transport: Send + Sync {
    fn send(&self, project: &str, request: &Document) -> Result<Document>;
}

/// Echoes requests back the way the remote system would answer them
#[derive(Debug)]
pub struct LoopbackTransport {
    next_id: AtomicU64,
    secret_keys: Vec<String>,
}

impl LoopbackTransport {
    pub fn new(secret_keys: &[&str]) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            secret_keys: secret_keys.iter().map(ToString::to_string).collect(),
        }
    }

    fn mint(&self) -> String {
        format!("ID{:05}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Give every named object lacking a real id one, remembering deferred keys
    fn assign_ids(&self, value: &mut Value, assigned: &mut HashMap<String, String>) {
        match value {
            Value::Object(object) => {
                if object.contains_key("name") {
                    let current = object.get("id").and_then(Value::as_str).map(str::to_string);
                    match current {
                        Some(id) if is_deferred_key(&id) => {
                            let real = self.mint();
                            log::debug!("loopback: {id} -> {real}");
                            assigned.insert(id, real.clone());
                            object.insert("id".to_string(), Value::String(real));
                        }
                        Some(_) => {}
                        None => {
                            object.insert("id".to_string(), Value::String(self.mint()));
                        }
                    }
                }
                object.retain(|key, _| !self.secret_keys.iter().any(|secret| secret == key));
                for child in object.values_mut() {
                    self.assign_ids(child, assigned);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.assign_ids(item, assigned);
                }
            }
            _ => {}
        }
    }
}

impl Transport for LoopbackTransport {
    fn send(&self, project: &str, request: &Document) -> Result<Document> {
        if request.is_empty() {
            bail!("empty request for project '{project}'");
        }

        let mut response = Value::Object(request.clone());
        let mut assigned = HashMap::new();
        self.assign_ids(&mut response, &mut assigned);
        rewrite_deferred(&mut response, &assigned);

        log::info!(
            "loopback: applied '{project}', {} new identifier(s)",
            assigned.len()
        );
        match response {
            Value::Object(document) => Ok(document),
            _ => bail!("response for '{project}' is not an object"),
        }
    }
}

pub fn is_deferred_key(value: &str) -> bool {
    DEFERRED_KEY.is_match(value)
}

/// Replace pointers to entities created in this request with their new ids
///
/// Only keys minted as an entity id in the request are rewritten; other text
/// that happens to look like a deferred key is operator data.
fn rewrite_deferred(value: &mut Value, assigned: &HashMap<String, String>) {
    match value {
        Value::String(text) => {
            if let Some(id) = assigned.get(text.as_str()) {
                *text = id.clone();
            }
        }
        Value::Object(object) => {
            for child in object.values_mut() {
                rewrite_deferred(child, assigned);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_deferred(item, assigned);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(document) => document,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_deferred_key_pattern() {
        assert!(is_deferred_key("connector:http:12"));
        assert!(is_deferred_key("jwt_template::3"));
        assert!(!is_deferred_key("smtp:CI123"));
        assert!(!is_deferred_key("Builtin"));
    }

    #[test]
    fn test_assigns_ids_and_rewrites_pointers() {
        let transport = LoopbackTransport::new(&["bearerToken"]);
        let request = document(json!({
            "name": "shop",
            "connectors": {"http": [{
                "id": "connector:http:1",
                "name": "C1",
                "bearerToken": "s3cr3t",
            }]},
            "messaging": {"connector": "connector:http:1"},
        }));

        let response = transport.send("shop", &request).unwrap();
        let connector = &response["connectors"]["http"][0];
        let id = connector["id"].as_str().unwrap();
        assert!(id.starts_with("ID"));
        assert_eq!(response["messaging"]["connector"], id);
        assert!(connector.get("bearerToken").is_none());
        assert!(response["id"].is_string());
    }

    #[test]
    fn test_keeps_existing_ids() {
        let transport = LoopbackTransport::new(&[]);
        let request = document(json!({"id": "P1", "name": "shop"}));
        let response = transport.send("shop", &request).unwrap();
        assert_eq!(response["id"], "P1");
    }

    #[test]
    fn test_lookalike_text_is_left_alone() {
        let transport = LoopbackTransport::new(&[]);
        let request = document(json!({
            "name": "shop",
            "connectors": {"http": [{
                "id": "connector:http:1",
                "name": "C1",
                "description": "note:x:1",
            }]},
            "pointer": "connector:http:9",
        }));

        let response = transport.send("shop", &request).unwrap();
        assert_eq!(response["connectors"]["http"][0]["description"], "note:x:1");
        assert_eq!(response["pointer"], "connector:http:9");
    }

    #[test]
    fn test_empty_request_fails() {
        let transport = LoopbackTransport::new(&[]);
        assert!(transport.send("shop", &Document::new()).is_err());
    }
}
