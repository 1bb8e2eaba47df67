//! ragcite-text
//!
//! Lexical relevance for the hybrid ranker: a BM25 scorer whose corpus
//! statistics are rebuilt from the chunk set of every query.
pub mod bm25;

pub use bm25::Bm25Scorer;
