use std::collections::HashMap;
use tracing::trace;

use ragcite_core::config::Bm25Params;
use ragcite_core::tokenize::tokenize;
use ragcite_core::traits::Scorer;
use ragcite_core::types::{Chunk, SourceKind};

/// Okapi BM25 over the chunks handed to each call.
///
/// Document frequencies and the average chunk length are computed from the
/// corpus passed to `score`, never cached between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25Scorer {
    params: Bm25Params,
}

impl Bm25Scorer {
    pub fn new(params: Bm25Params) -> Self { Self { params } }
}

impl Scorer for Bm25Scorer {
    fn name(&self) -> &'static str { "bm25" }

    fn kind(&self) -> SourceKind { SourceKind::Lexical }

    fn score(&self, query: &[String], corpus: &[Chunk]) -> Vec<f64> {
        if corpus.is_empty() { return Vec::new(); }
        if query.is_empty() { return vec![0.0; corpus.len()]; }

        let docs: Vec<TermCounts> = corpus.iter().map(|c| TermCounts::of(&c.text)).collect();
        let stats = CorpusStats::collect(&docs, query);
        trace!(docs = docs.len(), avgdl = stats.avgdl, "bm25 statistics");

        docs.iter().map(|doc| self.score_document(doc, query, &stats)).collect()
    }
}

impl Bm25Scorer {
    fn score_document(&self, doc: &TermCounts, query: &[String], stats: &CorpusStats) -> f64 {
        if doc.len == 0 { return 0.0; }
        let Bm25Params { k1, b } = self.params;
        let norm = k1 * (1.0 - b + b * doc.len as f64 / stats.avgdl);
        query.iter().fold(0.0, |acc, term| {
            let Some(&f) = doc.counts.get(term.as_str()) else { return acc };
            acc + stats.idf(term) * (f * (k1 + 1.0)) / (f + norm)
        })
    }
}

struct TermCounts {
    counts: HashMap<String, f64>,
    len: usize,
}

impl TermCounts {
    fn of(text: &str) -> Self {
        let mut counts: HashMap<String, f64> = HashMap::new();
        let mut len = 0;
        for term in tokenize(text) {
            *counts.entry(term).or_default() += 1.0;
            len += 1;
        }
        Self { counts, len }
    }
}

struct CorpusStats {
    n: f64,
    avgdl: f64,
    doc_freq: HashMap<String, f64>,
}

impl CorpusStats {
    /// Document frequencies are only needed for query terms.
    fn collect(docs: &[TermCounts], query: &[String]) -> Self {
        let mut doc_freq: HashMap<String, f64> = HashMap::new();
        for term in query {
            if doc_freq.contains_key(term) { continue; }
            let df = docs.iter().filter(|d| d.counts.contains_key(term)).count();
            doc_freq.insert(term.clone(), df as f64);
        }
        let total_len: usize = docs.iter().map(|d| d.len).sum();
        let n = docs.len() as f64;
        // an all-empty corpus has no lengths to average; any positive value keeps the formula finite
        let avgdl = if total_len == 0 { 1.0 } else { total_len as f64 / n };
        Self { n, avgdl, doc_freq }
    }

    fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freq.get(term).copied().unwrap_or(0.0);
        (1.0 + (self.n - df + 0.5) / (df + 0.5)).ln()
    }
}
