//! Plan modification
//!
//! When the engine is asked what would change, the proposed node (from the
//! operator's configuration) and the prior node (from the last successful
//! state) are paired up. Identity matching runs first, then the node-local
//! [`Modifier::modify`] callback, and the stabilized proposed node becomes the
//! authoritative proposal.

use crate::handler::Handler;
use crate::model::Model;
use crate::value::{TriState, TriStateObject};

/// Nodes that stabilize their proposed values against prior state
pub trait Modifier: Model {
    /// Re-attach prior identifiers to matching list items
    fn match_identities(&mut self, _prior: &Self) {}

    /// Node-local adjustments after matching
    fn modify(&mut self, _h: &mut Handler, _prior: &Self) {}
}

/// Run the plan hook on a proposed/prior pair
///
/// Skipped when there is no prior state or the proposal is absent. Returns
/// whether the hook ran.
pub fn modify_plan<M: Modifier>(
    h: &mut Handler,
    proposed: Option<&mut M>,
    prior: Option<&M>,
) -> bool {
    let (Some(proposed), Some(prior)) = (proposed, prior) else {
        log::debug!("no prior state to stabilize against, skipping plan modification");
        return false;
    };
    proposed.match_identities(prior);
    proposed.modify(h, prior);
    true
}

/// Run the plan hook on a nested object attribute
pub fn modify_object<M: Modifier>(
    h: &mut Handler,
    proposed: &mut TriStateObject<M>,
    prior: &TriStateObject<M>,
) -> bool {
    modify_plan(h, proposed.as_present_mut(), prior.as_present())
}

/// Keep the prior value when the operator left the attribute unset
///
/// Mostly used for server-assigned identifiers, which would otherwise show up
/// as "known after apply" on every plan.
pub fn preserve_prior<T: Clone>(proposed: &mut TriState<T>, prior: &TriState<T>) {
    if !proposed.is_present()
        && let Some(value) = prior.as_present()
    {
        *proposed = TriState::Present(value.clone());
    }
}
