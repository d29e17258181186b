//! Retrieval of raw source text for a [`RetrievalKey`](solfetch_source::RetrievalKey).
//!
//! The [`Fetcher`] trait is the resolver's only window onto the network.
//! [`UrlFetcher`] serves `http`, `https` and `file` keys; [`MemoryFetcher`]
//! serves a fixed in-memory tree and counts requests, which is what the
//! resolver's tests use to check that every file is fetched once.

#![warn(missing_docs)]

pub mod error;
pub mod fetcher;
pub mod http;
pub mod memory;

pub use error::FetchError;
pub use fetcher::{normalize_text, Fetcher};
pub use http::UrlFetcher;
pub use memory::MemoryFetcher;
