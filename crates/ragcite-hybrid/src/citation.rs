use tracing::warn;

use ragcite_core::types::{Chunk, Citation};

use crate::fusion::ScoredCandidate;

const UNKNOWN_SOURCE: &str = "unknown";
const ELLIPSIS: char = '…';

/// Turns ranked candidates into numbered citations.
#[derive(Debug, Clone, Copy)]
pub struct CitationBuilder {
    snippet_chars: usize,
}

impl CitationBuilder {
    pub fn new(snippet_chars: usize) -> Self { Self { snippet_chars: snippet_chars.max(1) } }

    /// Ordinals follow the ranking: the first candidate becomes `[1]`.
    pub fn build(&self, ranked: &[ScoredCandidate<'_>]) -> Vec<Citation> {
        ranked
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let chunk = candidate.chunk;
                Citation {
                    ordinal: i + 1,
                    chunk_id: chunk.id.clone(),
                    source: source_of(chunk),
                    locator: locator(chunk),
                    snippet: snippet(&chunk.text, self.snippet_chars),
                    score: candidate.reranked_score,
                }
            })
            .collect()
    }
}

fn source_of(chunk: &Chunk) -> String {
    let source = chunk.source.trim();
    if source.is_empty() { UNKNOWN_SOURCE.to_string() } else { source.to_string() }
}

/// `page 3, manual.pdf-chunk-7`, or `manual.pdf-chunk-7` for unpaged
/// sources. Chunks missing a source or a sequence number fall back to their
/// id so the citation stays usable.
pub fn locator(chunk: &Chunk) -> String {
    let source = chunk.source.trim();
    match chunk.sequence {
        Some(sequence) if !source.is_empty() => match chunk.page {
            Some(page) => format!("page {page}, {source}-chunk-{sequence}"),
            None => format!("{source}-chunk-{sequence}"),
        },
        _ => {
            warn!(chunk_id = %chunk.id, source = %chunk.source, "chunk lacks source or sequence, using placeholder locator");
            if chunk.id.trim().is_empty() { "unknown location".to_string() } else { format!("chunk {}", chunk.id) }
        }
    }
}

/// Whitespace-collapsed prefix of `text`, at most `max_chars` characters
/// including the trailing ellipsis added when the text was cut.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars { return collapsed; }
    let keep = max_chars.saturating_sub(1);
    let mut cut: String = collapsed.chars().take(keep).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(chunk: &Chunk, score: f64) -> ScoredCandidate<'_> {
        ScoredCandidate {
            chunk,
            raw: vec![],
            normalized: vec![],
            lexical_score: 0.0,
            semantic_score: 0.0,
            fused_score: score,
            overlap_ratio: 0.0,
            reranked_score: score,
        }
    }

    #[test]
    fn locator_formats() {
        let paged = Chunk::new("m-7", "manual.pdf", "x").with_page(3).with_sequence(7);
        assert_eq!(locator(&paged), "page 3, manual.pdf-chunk-7");
        let unpaged = Chunk::new("n-2", "notes.md", "x").with_sequence(2);
        assert_eq!(locator(&unpaged), "notes.md-chunk-2");
    }

    #[test]
    fn malformed_chunks_get_placeholders() {
        let no_sequence = Chunk::new("abc", "notes.md", "x");
        assert_eq!(locator(&no_sequence), "chunk abc");
        let blank = Chunk::new(" ", "  ", "x").with_sequence(1);
        assert_eq!(locator(&blank), "unknown location");
        assert_eq!(source_of(&blank), "unknown");
    }

    #[test]
    fn snippet_collapses_and_bounds() {
        assert_eq!(snippet("  a\n\tb   c ", 10), "a b c");
        let cut = snippet("alpha beta gamma delta", 12);
        assert_eq!(cut, "alpha beta…");
        assert!(cut.chars().count() <= 12);
        assert_eq!(snippet("ééééé", 3), "éé…");
        assert_eq!(snippet("abc", 1), "…");
    }

    #[test]
    fn ordinals_follow_ranking() {
        let a = Chunk::new("a", "a.md", "first").with_sequence(1);
        let b = Chunk::new("b", "b.md", "second").with_sequence(1);
        let ranked = vec![candidate(&b, 0.9), candidate(&a, 0.4)];
        let citations = CitationBuilder::new(50).build(&ranked);
        let summary: Vec<(usize, &str)> = citations.iter().map(|c| (c.ordinal, c.chunk_id.as_str())).collect();
        assert_eq!(summary, vec![(1, "b"), (2, "a")]);
        assert_eq!(citations[0].marker(), "[1]");
        assert!((citations[0].score - 0.9).abs() < 1e-12);
        assert_eq!(citations[1].locator, "a.md-chunk-1");
    }
}
