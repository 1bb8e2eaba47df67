//! Weighted score fusion, candidate window, overlap rerank and tie-breaks.
//!
//! Every scorer runs over the same borrowed corpus snapshot in parallel; the
//! passes join before fusion. Nothing here keeps state between calls.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use ragcite_core::config::{validate_weight_set, RetrievalConfig, Weights};
use ragcite_core::error::{Error, Result};
use ragcite_core::tokenize::term_set;
use ragcite_core::traits::Scorer;
use ragcite_core::types::{Chunk, SourceKind};
use ragcite_core::CancelToken;
use ragcite_text::Bm25Scorer;
use ragcite_vector::TfIdfScorer;

use crate::normalize::min_max_normalize;

/// A scorer together with its fusion weight.
#[derive(Clone)]
pub struct Channel {
    scorer: Arc<dyn Scorer>,
    weight: f64,
}

impl Channel {
    pub fn new(scorer: Arc<dyn Scorer>, weight: f64) -> Self { Self { scorer, weight } }

    pub fn kind(&self) -> SourceKind { self.scorer.kind() }

    pub fn name(&self) -> &'static str { self.scorer.name() }

    pub fn weight(&self) -> f64 { self.weight }
}

/// Sizes of one ranking pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    pub k: usize,
    pub window_size: usize,
    pub boost_weight: f64,
}

impl RankParams {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self { k: config.k, window_size: config.window_size, boost_weight: config.boost_weight }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidConfig("k must be at least 1".to_string()));
        }
        if self.window_size < self.k {
            return Err(Error::InvalidConfig(format!("window_size {} is smaller than k {}", self.window_size, self.k)));
        }
        if !self.boost_weight.is_finite() || self.boost_weight < 0.0 {
            return Err(Error::InvalidConfig(format!("boost_weight must be a non-negative number, got {}", self.boost_weight)));
        }
        Ok(())
    }
}

/// Per-query bookkeeping for one chunk. Raw and normalized scores are kept
/// per channel, in channel order.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub chunk: &'a Chunk,
    pub raw: Vec<f64>,
    pub normalized: Vec<f64>,
    /// Sum of the raw scores of the lexical channels.
    pub lexical_score: f64,
    /// Sum of the raw scores of the semantic channels.
    pub semantic_score: f64,
    pub fused_score: f64,
    pub overlap_ratio: f64,
    pub reranked_score: f64,
}

impl ScoredCandidate<'_> {
    pub fn chunk_id(&self) -> &str { &self.chunk.id }
}

/// Weighted sum of normalized scores. Non-negative weights keep it monotonic
/// in every input.
pub fn fuse(weights: &[f64], normalized: &[f64]) -> f64 {
    weights.iter().zip(normalized).map(|(w, s)| w * s).sum()
}

/// Fraction of the distinct query terms that literally occur among the
/// chunk's terms; 0 for a query without terms.
pub fn overlap_ratio(query_terms: &BTreeSet<String>, chunk_terms: &BTreeSet<String>) -> f64 {
    if query_terms.is_empty() { return 0.0; }
    let hits = query_terms.intersection(chunk_terms).count();
    hits as f64 / query_terms.len() as f64
}

/// Descending `primary`, then descending raw lexical score, then ascending
/// chunk id. Total, so the ranking never depends on iteration order.
pub fn rank_order(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>, primary: fn(&ScoredCandidate<'_>) -> f64) -> Ordering {
    primary(b)
        .total_cmp(&primary(a))
        .then_with(|| b.lexical_score.total_cmp(&a.lexical_score))
        .then_with(|| a.chunk.id.cmp(&b.chunk.id))
}

#[derive(Clone)]
pub struct HybridRanker {
    channels: Vec<Channel>,
}

impl HybridRanker {
    /// Fails with `InvalidWeights` unless the channel weights are
    /// non-negative and sum to 1.
    pub fn new(channels: Vec<Channel>) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::InvalidConfig("a ranker needs at least one scorer".to_string()));
        }
        let weights: Vec<f64> = channels.iter().map(Channel::weight).collect();
        validate_weight_set(&weights)?;
        Ok(Self { channels })
    }

    /// BM25 plus TF-IDF cosine with the configured weights.
    pub fn standard(config: &RetrievalConfig) -> Result<Self> {
        Self::new(vec![
            Channel::new(Arc::new(Bm25Scorer::new(config.bm25)), config.weights.lexical),
            Channel::new(Arc::new(TfIdfScorer::new()), config.weights.semantic),
        ])
    }

    pub fn channels(&self) -> &[Channel] { &self.channels }

    /// Same scorers, with every lexical channel weighted `weights.lexical`
    /// and every semantic channel `weights.semantic`.
    pub fn reweighted(&self, weights: &Weights) -> Result<Self> {
        weights.validate()?;
        let channels = self
            .channels
            .iter()
            .map(|c| {
                let weight = match c.kind() { SourceKind::Lexical => weights.lexical, SourceKind::Semantic => weights.semantic };
                Channel::new(Arc::clone(&c.scorer), weight)
            })
            .collect();
        Self::new(channels)
    }

    /// Ranks `corpus` against the query terms and returns at most `params.k`
    /// candidates, best first. An empty corpus yields no candidates; any
    /// non-empty corpus yields `min(k, distinct ids)` of them.
    pub fn rank<'a>(&self, query: &[String], corpus: &'a [Chunk], params: &RankParams, cancel: &CancelToken) -> Result<Vec<ScoredCandidate<'a>>> {
        params.validate()?;
        cancel.check()?;
        if corpus.is_empty() { return Ok(Vec::new()); }

        let raw: Vec<Vec<f64>> = self
            .channels
            .par_iter()
            .map(|channel| {
                let scores = channel.scorer.score(query, corpus);
                if scores.len() == corpus.len() {
                    scores
                } else {
                    warn!(scorer = channel.name(), got = scores.len(), expected = corpus.len(), "scorer returned misaligned scores, ignoring it");
                    vec![0.0; corpus.len()]
                }
            })
            .collect();
        cancel.check()?;

        let normalized: Vec<Vec<f64>> = raw.iter().map(Vec::as_slice).map(min_max_normalize).collect();
        let weights: Vec<f64> = self.channels.iter().map(Channel::weight).collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates: Vec<ScoredCandidate<'a>> = Vec::with_capacity(corpus.len());
        for (i, chunk) in corpus.iter().enumerate() {
            if !seen.insert(chunk.id.as_str()) {
                warn!(chunk_id = %chunk.id, "duplicate chunk id in corpus, keeping the first");
                continue;
            }
            candidates.push(self.candidate(chunk, i, &raw, &normalized, &weights));
        }

        candidates.sort_by(|a, b| rank_order(a, b, |c| c.fused_score));
        candidates.truncate(params.window_size);

        let query_terms: BTreeSet<String> = query.iter().cloned().collect();
        for candidate in &mut candidates {
            candidate.overlap_ratio = overlap_ratio(&query_terms, &term_set(&candidate.chunk.text));
            candidate.reranked_score = candidate.fused_score + params.boost_weight * candidate.overlap_ratio;
        }
        candidates.sort_by(|a, b| rank_order(a, b, |c| c.reranked_score));
        candidates.truncate(params.k);

        debug!(corpus = corpus.len(), query_terms = query_terms.len(), ranked = candidates.len(), "ranked corpus");
        Ok(candidates)
    }

    fn candidate<'a>(&self, chunk: &'a Chunk, i: usize, raw: &[Vec<f64>], normalized: &[Vec<f64>], weights: &[f64]) -> ScoredCandidate<'a> {
        let raw_i: Vec<f64> = raw.iter().map(|s| s[i]).collect();
        let normalized_i: Vec<f64> = normalized.iter().map(|s| s[i]).collect();
        let sum_kind = |kind: SourceKind| -> f64 {
            self.channels.iter().zip(&raw_i).filter(|(c, _)| c.kind() == kind).map(|(_, s)| *s).sum()
        };
        ScoredCandidate {
            chunk,
            lexical_score: sum_kind(SourceKind::Lexical),
            semantic_score: sum_kind(SourceKind::Semantic),
            fused_score: fuse(weights, &normalized_i),
            overlap_ratio: 0.0,
            reranked_score: 0.0,
            raw: raw_i,
            normalized: normalized_i,
        }
    }
}
