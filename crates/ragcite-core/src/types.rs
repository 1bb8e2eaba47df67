//! Domain types shared by the scorers, the hybrid ranker and the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ChunkId = String;

/// Identity of the user whose corpus a query runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self { Self::new(id) }
}

/// An immutable unit of retrievable text.
///
/// - `id`: unique within one user's corpus
/// - `source`: originating document name (e.g. `manual.pdf`)
/// - `page`: page number inside the source, when the source has pages
/// - `sequence`: 1-based position of the chunk within its source
/// - `ingested_at`: when the chunk entered the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    pub sequence: Option<usize>,
    pub ingested_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(id: impl Into<ChunkId>, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: source.into(),
            page: None,
            sequence: None,
            ingested_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self { self.page = Some(page); self }

    #[must_use]
    pub fn with_sequence(mut self, sequence: usize) -> Self { self.sequence = Some(sequence); self }

    #[must_use]
    pub fn ingested_at(mut self, at: DateTime<Utc>) -> Self { self.ingested_at = at; self }
}

/// Which family of signal a scorer produces.
///
/// Ties on the fused or reranked score are broken by the raw score of the
/// `Lexical` scorers, so every scorer has to declare its family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Lexical,
    Semantic,
}

/// One ranked, citable chunk.
///
/// `ordinal` is 1-based and matches the inline marker `[n]` a generator
/// places next to a grounded statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub ordinal: usize,
    pub chunk_id: ChunkId,
    pub source: String,
    pub locator: String,
    pub snippet: String,
    pub score: f64,
}

impl Citation {
    pub fn marker(&self) -> String { format!("[{}]", self.ordinal) }
}

/// Outcome of one retrieval.
///
/// `found` is false exactly when there are no citations. Callers must treat
/// that as "no grounding available", never as low-confidence grounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    found: bool,
    citations: Vec<Citation>,
}

impl QueryResult {
    pub fn not_found() -> Self { Self { found: false, citations: Vec::new() } }

    pub fn from_citations(citations: Vec<Citation>) -> Self {
        Self { found: !citations.is_empty(), citations }
    }

    pub fn found(&self) -> bool { self.found }

    pub fn citations(&self) -> &[Citation] { &self.citations }

    /// Numbered context block handed to the answer generator.
    pub fn render_context(&self) -> String {
        self.citations
            .iter()
            .map(|c| format!("{} source={}; locator={}\n{}\n", c.marker(), c.source, c.locator, c.snippet))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
