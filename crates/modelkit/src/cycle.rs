//! Request cycle drivers
//!
//! Serialization is two passes over the tree: the first registers every named
//! entity in the reference map (and validates), the second builds the document
//! and resolves name-based pointers. Nothing is serialized once an error has
//! been recorded, and nothing reaches the transport unless serialization
//! succeeded.

use crate::diag::DiagnosticKind;
use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::model::{self, Model};
use crate::value::Document;
use std::fmt::Display;

/// Collect references and validate; returns whether the tree is error-free
pub fn check<M: Model + ?Sized>(node: &M, h: &mut Handler) -> bool {
    model::collect_references(node, h);
    log::debug!("collected {} reference(s)", h.refs.len());
    model::validate(node, h);
    !h.diags.has_errors()
}

/// Build the outgoing document for a node
///
/// Fails with [`Error::Blocked`] if validation or reference resolution
/// recorded any error.
pub fn serialize<M: Model + ?Sized>(node: &M, h: &mut Handler) -> Result<Document> {
    if !check(node, h) {
        return Err(blocked(h));
    }
    let data = node.values(h);
    if h.diags.has_errors() {
        return Err(blocked(h));
    }
    Ok(data)
}

/// Populate a node from a response document
///
/// Never fails: decoding problems are recorded as warnings. Returns the number
/// of warnings recorded by this call.
pub fn populate<M: Model + ?Sized>(node: &mut M, h: &mut Handler, response: &Document) -> usize {
    let before = h.diags.warnings().count();
    node.set_values(h, response);
    h.diags.warnings().count() - before
}

/// Serialize, hand the document to the transport, then populate from the reply
pub fn exchange<M, F, E>(node: &mut M, h: &mut Handler, send: F) -> Result<Document>
where
    M: Model + ?Sized,
    F: FnOnce(&Document) -> std::result::Result<Document, E>,
    E: Display,
{
    let request = serialize(node, h)?;
    let response = match send(&request) {
        Ok(response) => response,
        Err(err) => {
            let message = err.to_string();
            h.record(DiagnosticKind::Transport, "Remote call failed", message.clone());
            return Err(Error::Transport { message });
        }
    };
    populate(node, h, &response);
    Ok(response)
}

fn blocked(h: &Handler) -> Error {
    Error::Blocked {
        errors: h.diags.error_list(),
    }
}
