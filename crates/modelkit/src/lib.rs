//! # Modelkit
//!
//! Attribute synchronization for declarative configuration models.
//!
//! This crate provides the plumbing between a typed configuration tree and the
//! dynamic documents a remote management API accepts and returns.
//!
//! ## Core Concepts
//!
//! - **TriState**: Every attribute is absent, pending (known after apply) or present
//! - **Model**: A node that serializes to and populates from a [`Document`]
//! - **Handler**: Per-request diagnostics plus the [`ReferenceMap`]
//! - **Reference**: Name-based pointers between sibling sub-resources, resolved
//!   to server ids or to deferred keys for entities created in the same request
//! - **Modifier**: Plan-time hook that stabilizes a proposal against prior state
//!
//! ## Example
//!
//! ```ignore
//! use modelkit::{attrs::scalar, Document, Handler, Model, StringValue};
//!
//! #[derive(Default)]
//! struct Connector { id: StringValue, name: StringValue }
//!
//! impl Model for Connector {
//!     fn values(&self, _h: &mut Handler) -> Document {
//!         let mut data = Document::new();
//!         scalar::get(&self.id, &mut data, "id");
//!         scalar::get(&self.name, &mut data, "name");
//!         data
//!     }
//!
//!     fn set_values(&mut self, h: &mut Handler, data: &Document) {
//!         scalar::set(&mut self.id, data, "id", h);
//!         scalar::set(&mut self.name, data, "name", h);
//!     }
//! }
//!
//! let mut h = Handler::new();
//! let document = modelkit::serialize(&connector, &mut h)?;
//! ```
//!
//! The crate performs no I/O. Sending documents is left to the caller, see
//! [`exchange`].

pub mod attrs;
pub mod cycle;
pub mod diag;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod model;
pub mod plan;
pub mod refs;
pub mod validate;
pub mod value;

// Re-export main types at crate root
pub use cycle::{check, exchange, populate, serialize};
pub use diag::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{Error, ErrorCategory, Result};
pub use handler::Handler;
pub use matcher::{MatchReport, Matchable, match_identities, match_list};
pub use model::{Collector, Model, Validator};
pub use plan::{Modifier, modify_object, modify_plan, preserve_prior};
pub use refs::{BUILTIN_CONNECTOR, CONNECTOR_NAMESPACE, KeyMinter, Reference, ReferenceMap};
pub use value::{
    BoolValue, Document, IntValue, StringValue, TriState, TriStateList, TriStateMap,
    TriStateObject, TriStateScalar, TriStateSet,
};
