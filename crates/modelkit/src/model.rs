//! The contract every configuration node implements
//!
//! A node must know how to serialize itself into a [`Document`] and how to
//! populate itself from one. Everything else is opt-in: a node that needs
//! structural checks exposes a [`Validator`], a node that other nodes point at
//! by name exposes a [`Collector`]. Parents compose children explicitly; there
//! is no generic traversal engine.

use crate::handler::Handler;
use crate::value::Document;

/// Core trait for configuration nodes
pub trait Model {
    /// Serialize outward into the remote document form
    fn values(&self, h: &mut Handler) -> Document;

    /// Populate inward from a remote response document
    fn set_values(&mut self, h: &mut Handler, data: &Document);

    /// Structural checks, if this node has any
    fn validator(&self) -> Option<&dyn Validator> {
        None
    }

    /// Reference registration, if this node (or its children) can be pointed at
    fn collector(&self) -> Option<&dyn Collector> {
        None
    }
}

/// Records structural invariant violations into the handler
pub trait Validator {
    fn validate(&self, h: &mut Handler);
}

/// Registers named entities into the handler's reference map
pub trait Collector {
    fn collect_references(&self, h: &mut Handler);
}

/// Run a node's validation, if it has any
pub fn validate<M: Model + ?Sized>(node: &M, h: &mut Handler) {
    if let Some(validator) = node.validator() {
        validator.validate(h);
    }
}

/// Run a node's reference collection, if it has any
pub fn collect_references<M: Model + ?Sized>(node: &M, h: &mut Handler) {
    if let Some(collector) = node.collector() {
        collector.collect_references(h);
    }
}
