//! Per-user retrieval: snapshot the user's corpus, rank it, cite it.

use anyhow::Result;
use tracing::{debug, info, instrument};

use ragcite_core::config::{RetrievalConfig, Weights};
use ragcite_core::tokenize::{sanitize_query, tokenize};
use ragcite_core::traits::CorpusStore;
use ragcite_core::types::{QueryResult, UserId};
use ragcite_core::CancelToken;

use crate::citation::CitationBuilder;
use crate::fusion::{HybridRanker, RankParams};

/// Per-call overrides of the configured retrieval knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetrieveParams {
    pub k: Option<usize>,
    pub window_size: Option<usize>,
    pub weights: Option<Weights>,
}

pub struct Retriever<S: CorpusStore> {
    store: S,
    config: RetrievalConfig,
    ranker: HybridRanker,
    citations: CitationBuilder,
}

impl<S: CorpusStore> Retriever<S> {
    /// BM25 plus TF-IDF cosine, weighted as configured.
    pub fn new(store: S, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        let ranker = HybridRanker::standard(&config)?;
        Self::with_ranker(store, config, ranker)
    }

    /// Uses a caller-assembled set of scorers instead of the standard pair.
    /// The configuration is validated the same way as in [`Retriever::new`].
    pub fn with_ranker(store: S, config: RetrievalConfig, ranker: HybridRanker) -> Result<Self> {
        config.validate()?;
        let citations = CitationBuilder::new(config.snippet_chars);
        Ok(Self { store, config, ranker, citations })
    }

    pub fn config(&self) -> &RetrievalConfig { &self.config }

    pub fn retrieve(&self, user: &UserId, query: &str) -> Result<QueryResult> {
        self.retrieve_cancellable(user, query, &RetrieveParams::default(), &CancelToken::new())
    }

    pub fn retrieve_with(&self, user: &UserId, query: &str, params: &RetrieveParams) -> Result<QueryResult> {
        self.retrieve_cancellable(user, query, params, &CancelToken::new())
    }

    /// Only `user`'s chunks are ever scored. `found` is false only when that
    /// corpus is empty; otherwise up to `k` citations come back even if no
    /// chunk shares a term with the query.
    #[instrument(skip(self, user, query, params, cancel), fields(user = %user))]
    pub fn retrieve_cancellable(&self, user: &UserId, query: &str, params: &RetrieveParams, cancel: &CancelToken) -> Result<QueryResult> {
        let rank_params = RankParams {
            k: params.k.unwrap_or(self.config.k),
            window_size: params.window_size.unwrap_or(self.config.window_size),
            boost_weight: self.config.boost_weight,
        };
        rank_params.validate()?;
        let reweighted = params.weights.map(|w| self.ranker.reweighted(&w)).transpose()?;
        let ranker = reweighted.as_ref().unwrap_or(&self.ranker);

        let query = sanitize_query(query, self.config.max_query_chars);
        let terms: Vec<String> = tokenize(&query).collect();

        let corpus = self.store.corpus(user)?;
        if corpus.is_empty() {
            info!("no chunks visible to user");
            return Ok(QueryResult::not_found());
        }
        debug!(chunks = corpus.len(), terms = terms.len(), "retrieving");

        let ranked = ranker.rank(&terms, &corpus, &rank_params, cancel)?;
        let citations = self.citations.build(&ranked);
        debug!(citations = citations.len(), "retrieved");
        Ok(QueryResult::from_citations(citations))
    }
}
