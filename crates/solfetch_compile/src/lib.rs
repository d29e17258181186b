//! Compiler invocation over a resolved import graph.
//!
//! This is the synchronous half of solfetch. A [`CompilerInput`] is built
//! from the entry unit of a [`ResolvedGraph`](solfetch_source::ResolvedGraph),
//! a [`Compiler`] runs it with an [`ImportBridge`] answering import requests
//! from memory, and [`compile`] extracts the selected contract's
//! [`CompiledArtifact`]. Nothing in this crate performs network I/O.

#![warn(missing_docs)]

pub mod artifact;
pub mod bridge;
pub mod compiler;
pub mod error;
pub mod input;
pub mod output;
pub mod report;

pub use artifact::{compile, select_contract, CompiledArtifact, ContractSelection};
pub use bridge::{ImportBridge, ImportRequest, ImportResolver, ImportResponse};
pub use compiler::{Compiler, SolcProcess};
pub use error::CompileError;
pub use input::{CompilerInput, CompilerSettings};
pub use output::{Bytecode, CompilerOutput, ContractOutput, LinkReferences, OutputError};
pub use report::report_errors;
