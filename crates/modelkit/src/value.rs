//! Three-state attribute values
//!
//! Every attribute in a configuration model is either absent (the operator
//! did not set it), pending (it will only be known after the remote system
//! acts, e.g. a server-generated identifier) or present with a concrete value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// The dynamic string-keyed document exchanged with the remote system
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Absent / pending / present attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriState<T> {
    /// No value, equivalent to omission
    Absent,
    /// Value will be known only after the remote system acts
    Pending,
    /// Concrete value
    Present(T),
}

/// A single scalar attribute
pub type TriStateScalar<T> = TriState<T>;

/// An ordered list attribute
pub type TriStateList<T> = TriState<Vec<T>>;

/// An unordered set attribute, written out sorted
pub type TriStateSet<T> = TriState<Vec<T>>;

/// A string-keyed map attribute
pub type TriStateMap<T> = TriState<BTreeMap<String, T>>;

/// A nested model attribute
pub type TriStateObject<T> = TriState<T>;

pub type StringValue = TriState<String>;
pub type BoolValue = TriState<bool>;
pub type IntValue = TriState<i64>;

impl<T> Default for TriState<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> TriState<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Borrow the concrete value, if any
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Mutably borrow the concrete value, if any
    pub fn as_present_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Consume into the concrete value, if any
    pub fn into_present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TriState<U> {
        match self {
            Self::Absent => TriState::Absent,
            Self::Pending => TriState::Pending,
            Self::Present(value) => TriState::Present(f(value)),
        }
    }

    /// `None` becomes absent
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }

    /// Replace a pending value with the given fallback; other states are kept
    pub fn resolve_pending(&mut self, fallback: impl FnOnce() -> Self) {
        if self.is_pending() {
            *self = fallback();
        }
    }

    /// Turn an absent value into a pending one (computed attributes)
    pub fn mark_pending(&mut self) {
        if self.is_absent() {
            *self = Self::Pending;
        }
    }
}

impl TriState<String> {
    /// The concrete string, or "" when absent or pending
    pub fn value_str(&self) -> &str {
        self.as_present().map_or("", String::as_str)
    }
}

impl<T> From<T> for TriState<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

impl From<&str> for TriState<String> {
    fn from(value: &str) -> Self {
        Self::Present(value.to_string())
    }
}

// Operator files and stored state carry no notion of "pending": it is
// written as null and read back as absent.
impl<T: Serialize> Serialize for TriState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => serializer.serialize_some(value),
            Self::Absent | Self::Pending => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TriState<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_option(Option::<T>::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_absent() {
        let value: StringValue = TriState::default();
        assert!(value.is_absent());
        assert_eq!(value.value_str(), "");
    }

    #[test]
    fn test_mark_pending_only_touches_absent() {
        let mut absent: IntValue = TriState::Absent;
        absent.mark_pending();
        assert!(absent.is_pending());

        let mut present: IntValue = TriState::Present(3);
        present.mark_pending();
        assert_eq!(present, TriState::Present(3));
    }

    #[test]
    fn test_resolve_pending() {
        let mut pending: BoolValue = TriState::Pending;
        pending.resolve_pending(|| TriState::Present(false));
        assert_eq!(pending, TriState::Present(false));

        let mut absent: BoolValue = TriState::Absent;
        absent.resolve_pending(|| TriState::Present(true));
        assert!(absent.is_absent());
    }

    #[test]
    fn test_serde_null_and_missing() {
        #[derive(Deserialize, Serialize, Default)]
        #[serde(default)]
        struct Node {
            name: StringValue,
            port: IntValue,
        }

        let node: Node = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert!(node.name.is_absent());
        assert!(node.port.is_absent());

        let node: Node = serde_json::from_str(r#"{"name": "api", "port": 25}"#).unwrap();
        assert_eq!(node.name, TriState::Present("api".to_string()));
        assert_eq!(node.port, TriState::Present(25));

        let pending = Node {
            name: TriState::Pending,
            port: TriState::Present(1),
        };
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json, serde_json::json!({"name": null, "port": 1}));
    }
}
