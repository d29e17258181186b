//! Retrieval keys, resolved source units and the dependency graph cache.
//!
//! This crate provides [`RetrievalKey`] and [`resolve_specifier`] for turning
//! import specifiers into canonical locations, the [`SourceCache`] populated
//! by the resolver, and the frozen [`ResolvedGraph`] that the compiler bridge
//! reads from once resolution has finished.

#![warn(missing_docs)]

pub mod cache;
pub mod graph;
pub mod key;
pub mod span;
pub mod unit;
pub mod unit_id;

pub use cache::SourceCache;
pub use graph::ResolvedGraph;
pub use key::{is_bare_specifier, resolve_specifier, KeyError, RetrievalKey};
pub use span::{ResolvedSpan, Span};
pub use unit::SourceUnit;
pub use unit_id::UnitId;
