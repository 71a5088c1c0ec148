//! Name-based references between sibling sub-resources
//!
//! Sub-resources (connectors, roles, templates) point at each other by name.
//! Before serialization every named entity registers itself here; entities
//! that already have a server-assigned identifier register that id, entities
//! being created in the same request get a synthetic deferred key instead.
//! Pointers are then resolved through the map while the document is built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Namespace used by connector references
pub const CONNECTOR_NAMESPACE: &str = "connector";

/// Name of the built-in connector, which is never declared
pub const BUILTIN_CONNECTOR: &str = "Builtin";

static BUILTIN_REFERENCE: LazyLock<Reference> =
    LazyLock::new(|| Reference::resolved("", BUILTIN_CONNECTOR));

static GLOBAL_MINTER: LazyLock<KeyMinter> = LazyLock::new(KeyMinter::new);

/// A named entity other nodes may point to
///
/// Exactly one of `id` and `deferred_key` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: String,
    pub id: String,
    pub deferred_key: String,
}

impl Reference {
    /// A reference to an entity that already has an identifier
    pub fn resolved(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            deferred_key: String::new(),
        }
    }

    /// A reference to an entity created in the same request
    pub fn deferred(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: String::new(),
            deferred_key: key.into(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        self.id.is_empty()
    }

    /// The identifier, or the deferred key when there is none yet
    pub fn reference_value(&self) -> &str {
        if self.id.is_empty() {
            &self.deferred_key
        } else {
            &self.id
        }
    }

    /// Value in the form the remote system expects for typed pointers
    ///
    /// Resolved identifiers are prefixed with their kind (`smtp:CI123`);
    /// deferred keys already carry it.
    pub fn provider_value(&self) -> String {
        if !self.kind.is_empty() && !self.id.is_empty() {
            format!("{}:{}", self.kind, self.id)
        } else {
            self.reference_value().to_string()
        }
    }
}

/// Mints process-wide unique deferred keys
///
/// Cloning shares the counter. [`KeyMinter::global`] is the default used by
/// every [`ReferenceMap`]; tests inject a fresh minter to get stable keys.
#[derive(Debug, Clone, Default)]
pub struct KeyMinter {
    counter: Arc<AtomicU64>,
}

impl KeyMinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide minter
    pub fn global() -> Self {
        GLOBAL_MINTER.clone()
    }

    /// Mint a new key of the form `namespace:kind:N`
    pub fn mint(&self, namespace: &str, kind: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{namespace}:{kind}:{n}")
    }

    /// Number of keys minted so far
    pub fn minted(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Per-request registry of `(namespace, name) → Reference`
#[derive(Debug, Clone)]
pub struct ReferenceMap {
    entries: HashMap<(String, String), Reference>,
    minter: KeyMinter,
}

impl Default for ReferenceMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceMap {
    /// An empty map minting from the global counter
    pub fn new() -> Self {
        Self::with_minter(KeyMinter::global())
    }

    pub fn with_minter(minter: KeyMinter) -> Self {
        Self {
            entries: HashMap::new(),
            minter,
        }
    }

    /// Register an entity by name
    ///
    /// An empty `id` mints a deferred key. When the name is already taken in
    /// the namespace the first registration is kept; duplicate names are
    /// reported by uniqueness validation, not here.
    pub fn add(&mut self, namespace: &str, kind: &str, id: &str, name: &str) -> &Reference {
        let key = (namespace.to_string(), name.to_string());
        if self.entries.contains_key(&key) {
            log::warn!("{namespace} '{name}' registered twice, keeping the first");
        }
        let minter = &self.minter;
        self.entries.entry(key).or_insert_with(|| {
            let reference = if id.is_empty() {
                Reference::deferred(kind, minter.mint(namespace, kind))
            } else {
                Reference::resolved(kind, id)
            };
            log::debug!(
                "registered {namespace} '{name}' as {}",
                reference.reference_value()
            );
            reference
        })
    }

    /// Look up an entity by name
    ///
    /// The built-in connector resolves without registration.
    pub fn get(&self, namespace: &str, name: &str) -> Option<&Reference> {
        if namespace == CONNECTOR_NAMESPACE && name == BUILTIN_CONNECTOR {
            return Some(&BUILTIN_REFERENCE);
        }
        self.entries.get(&(namespace.to_string(), name.to_string()))
    }

    /// Names registered in a namespace, sorted
    pub fn names(&self, namespace: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_without_id_mints_deferred_key() {
        let mut refs = ReferenceMap::with_minter(KeyMinter::new());
        refs.add("connector", "http", "", "My HTTP");

        let reference = refs.get("connector", "My HTTP").unwrap();
        assert!(reference.is_deferred());
        assert_eq!(reference.reference_value(), "connector:http:1");
        assert_eq!(reference.provider_value(), "connector:http:1");
    }

    #[test]
    fn test_add_with_id_is_resolved() {
        let mut refs = ReferenceMap::with_minter(KeyMinter::new());
        refs.add("connector", "smtp", "CI123", "Mailer");

        let reference = refs.get("connector", "Mailer").unwrap();
        assert!(!reference.is_deferred());
        assert_eq!(reference.reference_value(), "CI123");
        assert_eq!(reference.provider_value(), "smtp:CI123");
    }

    #[test]
    fn test_first_registration_wins() {
        let mut refs = ReferenceMap::with_minter(KeyMinter::new());
        refs.add("role", "", "R1", "admin");
        refs.add("role", "", "R2", "admin");
        assert_eq!(refs.get("role", "admin").unwrap().id, "R1");
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_namespaces_are_separate() {
        let mut refs = ReferenceMap::with_minter(KeyMinter::new());
        refs.add("role", "", "R1", "shared");
        assert!(refs.get("connector", "shared").is_none());
        assert_eq!(refs.names("role"), vec!["shared"]);
    }

    #[test]
    fn test_builtin_connector_needs_no_registration() {
        let refs = ReferenceMap::with_minter(KeyMinter::new());
        let reference = refs.get(CONNECTOR_NAMESPACE, BUILTIN_CONNECTOR).unwrap();
        assert_eq!(reference.reference_value(), BUILTIN_CONNECTOR);
        assert_eq!(reference.provider_value(), BUILTIN_CONNECTOR);
        assert!(refs.get("role", BUILTIN_CONNECTOR).is_none());
        assert!(refs.is_empty());
    }

    #[test]
    fn test_concurrent_deferred_keys_are_unique() {
        let minter = KeyMinter::new();
        let keys: Vec<String> = (0..1000)
            .into_par_iter()
            .map(|i| {
                // one map per request, sharing only the counter
                let mut refs = ReferenceMap::with_minter(minter.clone());
                refs.add("connector", "http", "", &format!("c{i}"))
                    .reference_value()
                    .to_string()
            })
            .collect();

        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert_eq!(minter.minted(), 1000);
    }
}
