//! Diagnostics collected during one request
//!
//! Validation never stops at the first problem: every check records into the
//! shared sink so the operator sees the full set of issues in one pass. Only
//! errors block serialization; warnings and informational entries never do.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Categories of diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A name points to nothing registered in the reference map
    UnresolvableReference,
    /// Two mutually exclusive attribute groups are both set
    ConflictingAttributes,
    /// A conditionally required attribute is absent
    MissingAttribute,
    /// Duplicate names among siblings
    UniquenessViolation,
    /// A response value disagrees with what was known before
    Mismatch,
    /// An attribute value is outside what the model accepts
    InvalidValue,
    /// The transport collaborator reported a failure
    Transport,
}

impl DiagnosticKind {
    /// Default severity for this kind of diagnostic
    pub fn severity(&self) -> Severity {
        match self {
            Self::Mismatch => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short label used in user-facing output
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnresolvableReference => "unresolvable reference",
            Self::ConflictingAttributes => "conflicting attributes",
            Self::MissingAttribute => "missing attribute",
            Self::UniquenessViolation => "duplicate name",
            Self::Mismatch => "mismatch",
            Self::InvalidValue => "invalid value",
            Self::Transport => "transport failure",
        }
    }
}

/// A single recorded problem or note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// One-line human-readable summary
    pub summary: String,
    /// Longer explanation, possibly empty
    pub detail: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.summary)?;
        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }
        Ok(())
    }
}

/// Per-request diagnostics sink
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => log::debug!("error recorded: {diagnostic}"),
            Severity::Warning => log::debug!("warning recorded: {diagnostic}"),
            Severity::Info => log::trace!("info recorded: {diagnostic}"),
        }
        self.items.push(diagnostic);
    }

    /// Record an informational note that never blocks
    pub fn info(
        &mut self,
        kind: DiagnosticKind,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity: Severity::Info,
            kind,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Number of diagnostics of the given kind
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clone out the error diagnostics
    pub fn error_list(&self) -> Vec<Diagnostic> {
        self.errors().cloned().collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_block() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(DiagnosticKind::Mismatch, "name changed", ""));
        diags.info(DiagnosticKind::UnresolvableReference, "note", "");
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_errors_accumulate() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(DiagnosticKind::UniquenessViolation, "dup", ""));
        diags.push(Diagnostic::new(DiagnosticKind::MissingAttribute, "missing", ""));
        assert!(diags.has_errors());
        assert_eq!(diags.errors().count(), 2);
        assert_eq!(diags.count_of(DiagnosticKind::MissingAttribute), 1);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(
            DiagnosticKind::UnresolvableReference,
            "unknown connector 'C2'",
            "no connector named 'C2' was declared",
        );
        assert_eq!(
            d.to_string(),
            "unresolvable reference: unknown connector 'C2' (no connector named 'C2' was declared)"
        );
    }
}
