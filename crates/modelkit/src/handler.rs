//! Per-request context threaded through every model operation

use crate::diag::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::refs::{KeyMinter, Reference, ReferenceMap};

/// State owned by one request cycle
///
/// A handler is created fresh for each validate / plan / apply / read of one
/// top-level resource and dropped afterwards. It is never shared between
/// concurrent requests.
#[derive(Debug, Default)]
pub struct Handler {
    pub diags: Diagnostics,
    pub refs: ReferenceMap,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler whose reference map mints from the given counter
    pub fn with_minter(minter: KeyMinter) -> Self {
        Self {
            diags: Diagnostics::new(),
            refs: ReferenceMap::with_minter(minter),
        }
    }

    /// Record a diagnostic with the kind's default severity
    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.diags.push(Diagnostic::new(kind, summary, detail));
    }

    pub fn invalid(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.record(DiagnosticKind::InvalidValue, summary, detail);
    }

    pub fn missing(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.record(DiagnosticKind::MissingAttribute, summary, detail);
    }

    pub fn conflict(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.record(DiagnosticKind::ConflictingAttributes, summary, detail);
    }

    pub fn duplicate(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.record(DiagnosticKind::UniquenessViolation, summary, detail);
    }

    pub fn mismatch(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.record(DiagnosticKind::Mismatch, summary, detail);
    }

    /// Resolve a pointer by name, recording an error when nothing matches
    pub fn resolve(&mut self, namespace: &str, name: &str) -> Option<Reference> {
        if let Some(reference) = self.refs.get(namespace, name) {
            return Some(reference.clone());
        }
        self.record(
            DiagnosticKind::UnresolvableReference,
            format!("Unknown {namespace} reference '{name}'"),
            format!("No {namespace} named '{name}' was declared"),
        );
        None
    }

    /// Resolve a pointer by name, leaving it unset when nothing matches
    ///
    /// Used for forward-declared optional settings: the remote system
    /// rejects the request itself if the value was truly required.
    pub fn resolve_optional(&mut self, namespace: &str, name: &str) -> Option<Reference> {
        let found = self.refs.get(namespace, name).cloned();
        if found.is_none() {
            log::debug!("{namespace} '{name}' not declared, leaving unset");
            self.diags.info(
                DiagnosticKind::UnresolvableReference,
                format!("{namespace} '{name}' is not declared in this configuration"),
                "The value is left unset",
            );
        }
        found
    }
}
