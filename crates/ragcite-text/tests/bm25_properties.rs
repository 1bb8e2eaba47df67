use proptest::prelude::*;

use ragcite_core::config::Bm25Params;
use ragcite_core::tokenize::{term_set, tokenize};
use ragcite_core::traits::Scorer;
use ragcite_core::Chunk;
use ragcite_text::Bm25Scorer;

const VOCAB: [&str; 8] = ["alpha", "beta", "gamma", "delta", "rust", "tokio", "serde", "citation"];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB.to_vec()), 0..12).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn scores_are_finite_non_negative_and_zero_without_overlap(
        texts in prop::collection::vec(text_strategy(), 0..8),
        query in text_strategy(),
        k1 in 0.0f64..3.0,
        b in 0.0f64..=1.0,
    ) {
        let corpus: Vec<Chunk> = texts.iter().enumerate().map(|(i, t)| Chunk::new(format!("c{i}"), "doc.txt", t.clone())).collect();
        let query_terms: Vec<String> = tokenize(&query).collect();
        let scores = Bm25Scorer::new(Bm25Params { k1, b }).score(&query_terms, &corpus);

        prop_assert_eq!(scores.len(), corpus.len());
        let wanted = term_set(&query);
        for (chunk, score) in corpus.iter().zip(&scores) {
            prop_assert!(score.is_finite());
            prop_assert!(*score >= 0.0);
            if term_set(&chunk.text).is_disjoint(&wanted) {
                prop_assert_eq!(*score, 0.0);
            }
        }
    }

    #[test]
    fn scoring_is_repeatable(texts in prop::collection::vec(text_strategy(), 1..6), query in text_strategy()) {
        let corpus: Vec<Chunk> = texts.iter().enumerate().map(|(i, t)| Chunk::new(format!("c{i}"), "doc.txt", t.clone())).collect();
        let query_terms: Vec<String> = tokenize(&query).collect();
        let scorer = Bm25Scorer::default();
        prop_assert_eq!(scorer.score(&query_terms, &corpus), scorer.score(&query_terms, &corpus));
    }
}
