//! List identity matching
//!
//! Declarative list attributes have no durable per-item identity: the operator
//! can reorder, insert or rename entries between applies. The remote system
//! still needs a stable identifier per item to update it in place instead of
//! recreating it, so before serialization every proposed item is matched to a
//! prior item by key (usually its name) and inherits the prior identifier.

use crate::value::{StringValue, TriStateList};
use std::collections::{HashMap, HashSet};

/// A list element eligible for identity matching
pub trait Matchable {
    fn name(&self) -> &StringValue;

    fn id(&self) -> &StringValue;

    fn set_id(&mut self, id: StringValue);

    /// Key used to pair proposed and prior items
    ///
    /// Defaults to the name. Items without a present key never match.
    fn match_key(&self) -> Option<&str> {
        self.name().as_present().map(String::as_str)
    }
}

/// Outcome of matching one list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Proposed items that inherited a prior identifier
    pub matched: usize,
    /// Proposed items with no prior counterpart and no identifier of their own
    pub created: usize,
    /// Prior items no longer proposed
    pub removed: usize,
}

impl MatchReport {
    /// Merge another report into this one
    pub fn merge(&mut self, other: &MatchReport) {
        self.matched += other.matched;
        self.created += other.created;
        self.removed += other.removed;
    }

    pub fn total(&self) -> usize {
        self.matched + self.created + self.removed
    }
}

/// Re-attach prior identifiers to proposed items with the same key
///
/// Items that already carry a present identifier are left alone. When keys
/// repeat the first prior item wins; duplicates are a configuration error
/// reported by uniqueness validation.
pub fn match_identities<T: Matchable>(proposed: &mut [T], prior: &[T]) -> MatchReport {
    let mut known: HashMap<&str, &StringValue> = HashMap::new();
    for item in prior {
        if let Some(key) = item.match_key()
            && item.id().is_present()
        {
            known.entry(key).or_insert(item.id());
        }
    }

    let mut report = MatchReport::default();
    let mut proposed_keys = HashSet::new();
    for item in proposed.iter_mut() {
        let key = item.match_key().map(str::to_string);
        if let Some(key) = &key {
            proposed_keys.insert(key.clone());
        }
        if item.id().is_present() {
            continue;
        }
        match key.as_deref().and_then(|k| known.get(k)) {
            Some(id) => {
                log::debug!(
                    "matched '{}' to prior id {}",
                    key.as_deref().unwrap_or(""),
                    id.value_str()
                );
                item.set_id((*id).clone());
                report.matched += 1;
            }
            None => report.created += 1,
        }
    }

    report.removed = prior
        .iter()
        .filter_map(Matchable::match_key)
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|key| !proposed_keys.contains(*key))
        .count();
    report
}

/// Match a list attribute against its prior value
///
/// Does nothing unless both sides are present.
pub fn match_list<T: Matchable>(
    proposed: &mut TriStateList<T>,
    prior: &TriStateList<T>,
) -> MatchReport {
    match (proposed.as_present_mut(), prior.as_present()) {
        (Some(proposed), Some(prior)) => match_identities(proposed, prior),
        _ => MatchReport::default(),
    }
}
