use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

use ragcite_core::tokenize::tokenize;
use ragcite_core::traits::Scorer;
use ragcite_core::types::{Chunk, SourceKind};

use crate::sparse::SparseVector;

/// TF-IDF cosine similarity between the query and every chunk.
///
/// The space is fitted on the chunks plus the query as one extra
/// pseudo-document, with smoothed IDF `ln((1 + n) / (1 + df)) + 1`, raw term
/// counts and L2-normalized vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfScorer;

impl TfIdfScorer {
    pub fn new() -> Self { Self }
}

impl Scorer for TfIdfScorer {
    fn name(&self) -> &'static str { "tfidf-cosine" }

    fn kind(&self) -> SourceKind { SourceKind::Semantic }

    fn score(&self, query: &[String], corpus: &[Chunk]) -> Vec<f64> {
        if corpus.is_empty() { return Vec::new(); }

        let docs: Vec<BTreeMap<String, f64>> = corpus.iter().map(|c| term_counts(tokenize(&c.text))).collect();
        let query_counts = term_counts(query.iter().cloned());
        let idf = Idf::fit(docs.iter().chain(std::iter::once(&query_counts)));
        trace!(docs = docs.len(), vocabulary = idf.df.len(), "tfidf space");

        let query_vector = idf.weigh(&query_counts);
        if query_vector.is_empty() { return vec![0.0; corpus.len()]; }

        docs.iter()
            .map(|counts| {
                let doc_vector = idf.weigh(counts);
                if doc_vector.is_empty() { 0.0 } else { query_vector.dot(&doc_vector) }
            })
            .collect()
    }
}

fn term_counts(terms: impl Iterator<Item = String>) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for term in terms { *counts.entry(term).or_default() += 1.0; }
    counts
}

struct Idf {
    n: f64,
    df: BTreeMap<String, f64>,
}

impl Idf {
    fn fit<'a>(docs: impl Iterator<Item = &'a BTreeMap<String, f64>>) -> Self {
        let mut df: BTreeMap<String, f64> = BTreeMap::new();
        let mut n = 0usize;
        for doc in docs {
            n += 1;
            let distinct: BTreeSet<&String> = doc.keys().collect();
            for term in distinct { *df.entry(term.clone()).or_default() += 1.0; }
        }
        Self { n: n as f64, df }
    }

    fn idf(&self, term: &str) -> f64 {
        let df = self.df.get(term).copied().unwrap_or(0.0);
        ((1.0 + self.n) / (1.0 + df)).ln() + 1.0
    }

    /// Unit-length TF-IDF vector of `counts`; empty when `counts` is.
    fn weigh(&self, counts: &BTreeMap<String, f64>) -> SparseVector {
        let mut vector = SparseVector::new();
        for (term, tf) in counts { vector.add(term, tf * self.idf(term)); }
        vector.l2_normalized()
    }
}
