//! Structured diagnostic messages.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use solfetch_source::Span;

/// One diagnostic reported while compiling a resolved graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level.
    pub severity: Severity,
    /// The compiler's error class, e.g. `ParserError` or `TypeError`.
    pub kind: String,
    /// The compiler's numeric error code, when it reports one.
    pub code: Option<String>,
    /// The main message.
    pub message: String,
    /// Location in the resolved graph, when the compiler gave one we could map.
    pub span: Option<Span>,
    /// Extra lines shown as `= note: ...`.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity, kind and message.
    pub fn new(severity: Severity, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind: kind.into(),
            code: None,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    /// Creates a warning diagnostic.
    pub fn warning(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    /// Sets the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attaches a source location.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
