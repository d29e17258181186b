//! Conversion of compiler-reported errors into diagnostics.

use crate::output::{CompilerOutput, OutputError};
use solfetch_diagnostics::{Diagnostic, DiagnosticSink};
use solfetch_source::{ResolvedGraph, Span};

/// Emits every entry of `output.errors` into `sink`.
///
/// Locations are mapped back onto units of `graph` when the compiler's file
/// name is one the graph knows; otherwise the file name is kept as a note.
pub fn report_errors(output: &CompilerOutput, graph: &ResolvedGraph, sink: &DiagnosticSink) {
    for error in &output.errors {
        sink.emit(to_diagnostic(error, graph));
    }
}

fn to_diagnostic(error: &OutputError, graph: &ResolvedGraph) -> Diagnostic {
    let mut diag = Diagnostic::new(error.severity, error.kind.as_str(), error.message.as_str());
    if let Some(code) = &error.error_code {
        diag = diag.with_code(code.as_str());
    }
    if let Some(loc) = &error.source_location {
        match graph.lookup(&loc.file) {
            Some(unit) if loc.start >= 0 => {
                let start = loc.start as u32;
                let end = loc.end.max(loc.start) as u32;
                diag = diag.with_span(Span::new(unit.id, start, end));
            }
            _ => diag = diag.with_note(format!("in {}", loc.file)),
        }
    }
    diag
}
