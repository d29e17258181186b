//! Rendering diagnostics against the resolved source graph.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use solfetch_source::SourceCache;

/// Formats a diagnostic for output.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic. Source excerpts are read from `sources`.
    fn render(&self, diag: &Diagnostic, sources: &SourceCache) -> String;
}

/// Renders diagnostics in a rustc-like terminal layout:
///
/// ```text
/// error[7576]: DeclarationError: Undeclared identifier.
///   --> https://host/A.sol:3:9
///   |
/// 3 |     x = y;
///   |         ^
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to color the severity with ANSI escapes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        let code = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Info => "36",
        };
        format!("\x1b[1;{code}m{severity}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, sources: &SourceCache) -> String {
        let mut out = String::new();

        let severity = self.severity_label(diag.severity);
        match &diag.code {
            Some(code) => out.push_str(&format!(
                "{severity}[{code}]: {}: {}\n",
                diag.kind, diag.message
            )),
            None => out.push_str(&format!("{severity}: {}: {}\n", diag.kind, diag.message)),
        }

        if let Some(span) = diag.span {
            let resolved = sources.resolve_span(span);
            out.push_str(&format!("  --> {resolved}\n"));

            let unit = sources.get(span.unit);
            let line_num = resolved.start_line.to_string();
            let padding = " ".repeat(line_num.len());
            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {}\n", unit.line_text(span.start)));

            let carets = if resolved.end_line == resolved.start_line {
                (resolved.end_col - resolved.start_col + 1).max(1) as usize
            } else {
                1
            };
            let col_padding = " ".repeat((resolved.start_col as usize).saturating_sub(1));
            out.push_str(&format!(
                "{padding} | {col_padding}{}\n",
                "^".repeat(carets)
            ));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        out
    }
}

/// Renders each diagnostic as one line of JSON.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic, sources: &SourceCache) -> String {
        let location = diag.span.map(|span| sources.resolve_span(span));
        let value = serde_json::json!({
            "severity": diag.severity,
            "kind": diag.kind,
            "code": diag.code,
            "message": diag.message,
            "location": location,
            "notes": diag.notes,
        });
        format!("{value}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solfetch_source::Span;

    fn sources() -> (SourceCache, Span) {
        let mut cache = SourceCache::new();
        let id = cache
            .add_source(
                "https://host/A.sol",
                "pragma solidity ^0.8.0;\ncontract A { uint x = y; }\n",
            )
            .unwrap();
        // "y" on line 2
        (cache, Span::new(id, 46, 47))
    }

    #[test]
    fn terminal_with_span() {
        let (cache, span) = sources();
        let diag = Diagnostic::error("DeclarationError", "Undeclared identifier.")
            .with_code("7576")
            .with_span(span);
        let out = TerminalRenderer::new(false).render(&diag, &cache);
        assert!(out.starts_with("error[7576]: DeclarationError: Undeclared identifier.\n"));
        assert!(out.contains("--> https://host/A.sol:2:23"));
        assert!(out.contains("2 | contract A { uint x = y; }"));
        assert!(out.contains(&format!("  | {}^\n", " ".repeat(22))));
    }

    #[test]
    fn terminal_without_span_or_code() {
        let cache = SourceCache::new();
        let diag = Diagnostic::warning("Warning", "Unnamed return variable.")
            .with_note("consider naming it");
        let out = TerminalRenderer::new(false).render(&diag, &cache);
        assert_eq!(
            out,
            "warning: Warning: Unnamed return variable.\n   = note: consider naming it\n"
        );
    }

    #[test]
    fn terminal_color() {
        let cache = SourceCache::new();
        let diag = Diagnostic::error("TypeError", "bad");
        let out = TerminalRenderer::new(true).render(&diag, &cache);
        assert!(out.starts_with("\x1b[1;31merror\x1b[0m"));
    }

    #[test]
    fn json_output() {
        let (cache, span) = sources();
        let diag = Diagnostic::error("DeclarationError", "Undeclared identifier.").with_span(span);
        let out = JsonRenderer.render(&diag, &cache);
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["severity"], "error");
        assert_eq!(value["location"]["source"], "https://host/A.sol");
        assert_eq!(value["location"]["start_line"], 2);
        assert!(value["code"].is_null());
    }
}
