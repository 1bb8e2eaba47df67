//! ragcite-core
//!
//! Domain types, traits and shared plumbing for the ragcite retrieval engine:
//! chunks and citations, the `Scorer` and `CorpusStore` seams, the tokenizer,
//! Figment-backed configuration and the plain-text corpus stores.
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod cancel;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod store;
pub mod tokenize;
pub mod traits;
pub mod types;

pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use types::{Chunk, ChunkId, Citation, QueryResult, SourceKind, UserId};
