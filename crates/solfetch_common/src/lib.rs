//! Shared foundational types used across the solfetch workspace.
//!
//! This crate provides content hashing for resolved source units and the
//! internal error type used when an invariant of the resolver or the compiler
//! bridge is violated.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, SolfetchResult};
