use crate::types::{Chunk, SourceKind, UserId};

/// Scores a query against a chunk set and returns raw per-chunk scores.
///
/// The returned vector is aligned with `corpus`: entry `i` is the score of
/// `corpus[i]`. Scores are non-negative and finite; higher is better. Any
/// statistics a scorer needs are computed inside the call.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> SourceKind;
    fn score(&self, query: &[String], corpus: &[Chunk]) -> Vec<f64>;
}

/// Supplies the full, current chunk set visible to one user.
pub trait CorpusStore: Send + Sync {
    fn corpus(&self, user: &UserId) -> anyhow::Result<Vec<Chunk>>;
}
