//! Structural validation helpers
//!
//! Each helper records into the handler and returns whether the check passed,
//! so callers can keep going and report every problem in one pass.

use crate::handler::Handler;
use crate::matcher::Matchable;
use crate::value::TriStateList;
use std::collections::HashSet;

/// Report every name that appears more than once
pub fn unique_names<'a, I>(h: &mut Handler, what: &str, names: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            h.duplicate(
                format!("Duplicate {what} name '{name}'"),
                format!("Each {what} must have a unique name"),
            );
        }
    }
    reported.is_empty()
}

/// Report duplicate match keys within one list attribute
pub fn unique_items<T: Matchable>(h: &mut Handler, what: &str, items: &TriStateList<T>) -> bool {
    let keys = items
        .as_present()
        .into_iter()
        .flatten()
        .filter_map(Matchable::match_key);
    unique_names(h, what, keys)
}

/// Report when more than one of the alternatives is set
///
/// `groups` pairs an attribute name with whether it is set.
pub fn mutually_exclusive(h: &mut Handler, context: &str, groups: &[(&str, bool)]) -> bool {
    let set: Vec<&str> = groups
        .iter()
        .filter(|(_, is_set)| *is_set)
        .map(|(name, _)| *name)
        .collect();
    if set.len() <= 1 {
        return true;
    }
    h.conflict(
        format!("Conflicting attributes in {context}"),
        format!("Only one of {} may be set", set.join(", ")),
    );
    false
}

/// Report when `attribute` applies but `required` is not set
pub fn requires(
    h: &mut Handler,
    context: &str,
    attribute: &str,
    applies: bool,
    required: &str,
    required_set: bool,
) -> bool {
    if !applies || required_set {
        return true;
    }
    h.missing(
        format!("Missing attribute '{required}' in {context}"),
        format!("The '{required}' attribute is required when '{attribute}' is set"),
    );
    false
}

/// Report when `attribute` applies and `forbidden` is set anyway
pub fn forbids(
    h: &mut Handler,
    context: &str,
    attribute: &str,
    applies: bool,
    forbidden: &str,
    forbidden_set: bool,
) -> bool {
    if !applies || !forbidden_set {
        return true;
    }
    h.conflict(
        format!("Unexpected attribute '{forbidden}' in {context}"),
        format!("The '{forbidden}' attribute cannot be used when '{attribute}' is set"),
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagnosticKind;
    use crate::value::{StringValue, TriState};

    #[test]
    fn test_unique_names_reports_each_duplicate_once() {
        let mut h = Handler::new();
        let ok = unique_names(&mut h, "connector", ["a", "b", "a", "a", "c", "b"]);
        assert!(!ok);
        assert_eq!(h.diags.count_of(DiagnosticKind::UniquenessViolation), 2);
    }

    #[test]
    fn test_unique_items() {
        struct Named(StringValue, StringValue);
        impl Matchable for Named {
            fn name(&self) -> &StringValue {
                &self.0
            }
            fn id(&self) -> &StringValue {
                &self.1
            }
            fn set_id(&mut self, id: StringValue) {
                self.1 = id;
            }
        }

        let mut h = Handler::new();
        let items = TriState::Present(vec![
            Named("x".into(), StringValue::Absent),
            Named("x".into(), StringValue::Absent),
            Named(StringValue::Absent, StringValue::Absent),
        ]);
        assert!(!unique_items(&mut h, "role", &items));
        assert_eq!(h.diags.len(), 1);
    }

    #[test]
    fn test_mutually_exclusive() {
        let mut h = Handler::new();
        assert!(mutually_exclusive(&mut h, "connector", &[("a", true), ("b", false)]));
        assert!(!mutually_exclusive(&mut h, "connector", &[("a", true), ("b", true)]));
        assert_eq!(h.diags.count_of(DiagnosticKind::ConflictingAttributes), 1);
    }

    #[test]
    fn test_requires_and_forbids() {
        let mut h = Handler::new();
        assert!(requires(&mut h, "settings", "x", false, "y", false));
        assert!(requires(&mut h, "settings", "x", true, "y", true));
        assert!(!requires(&mut h, "settings", "x", true, "y", false));
        assert!(!forbids(&mut h, "settings", "x", true, "y", true));
        assert!(forbids(&mut h, "settings", "x", true, "y", false));
        assert_eq!(h.diags.count_of(DiagnosticKind::MissingAttribute), 1);
        assert_eq!(h.diags.count_of(DiagnosticKind::ConflictingAttributes), 1);
    }
}
