//! Recursive, cache-coherent resolution of a remote import graph.
//!
//! Starting from an entry [`RetrievalKey`](solfetch_source::RetrievalKey) the
//! [`Resolver`] fetches every transitively imported file exactly once,
//! rewrites `$(NAME)` placeholders from a [`ParameterSet`], and records the
//! result in a [`SourceCache`](solfetch_source::SourceCache). Resolution
//! finishes by freezing the cache into a
//! [`ResolvedGraph`](solfetch_source::ResolvedGraph), which is the only
//! thing the synchronous compiler bridge is allowed to read.

#![warn(missing_docs)]

pub mod error;
pub mod imports;
pub mod params;
pub mod resolver;

pub use error::ResolveError;
pub use imports::extract_imports;
pub use params::{substitute, ParameterParseError, ParameterSet};
pub use resolver::{resolve, ResolveOptions, Resolver};
