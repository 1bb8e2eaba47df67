//! Hybrid lexical + semantic retrieval with numbered citations.
//!
//! Scores from every scorer are min-max normalized per query, fused with
//! fixed weights, cut to a candidate window, reranked by literal query-term
//! overlap and turned into citations.

pub mod citation;
pub mod engine;
pub mod fusion;
pub mod normalize;

pub use citation::CitationBuilder;
pub use engine::{RetrieveParams, Retriever};
pub use fusion::{Channel, HybridRanker, RankParams, ScoredCandidate};
pub use normalize::min_max_normalize;
