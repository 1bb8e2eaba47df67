//! ragcite-vector
//!
//! Semantic relevance for the hybrid ranker. The vector space is a
//! deterministic bag-of-words TF-IDF space built per query; no learned
//! embedding model is involved.
pub mod sparse;
pub mod tfidf;

pub use sparse::SparseVector;
pub use tfidf::TfIdfScorer;
