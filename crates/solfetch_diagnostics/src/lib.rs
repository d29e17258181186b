//! Structured compiler diagnostics and their rendering.
//!
//! Errors and warnings reported by the compiler are converted into
//! [`Diagnostic`]s, accumulated in a thread-safe [`DiagnosticSink`], and
//! rendered against the resolved source graph by a [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
