use proptest::prelude::*;

use ragcite_core::tokenize::{sanitize_query, tokenize};

proptest! {
    #[test]
    fn terms_are_lowercase_alphanumeric(
        text in "[a-zA-Z0-9 ,.!?'_\u{2019}İıÀ-ÿΑ-ωА-я\u{0900}-\u{097F}\u{0300}-\u{0308}-]{0,64}",
    ) {
        for term in tokenize(&text) {
            prop_assert!(!term.is_empty());
            prop_assert!(term.chars().all(char::is_alphanumeric), "{:?}", term);
            prop_assert!(!term.chars().any(char::is_uppercase), "{:?}", term);
        }
        let again: Vec<String> = tokenize(&text).collect();
        prop_assert_eq!(tokenize(&text).collect::<Vec<_>>(), again);
    }

    #[test]
    fn sanitized_queries_are_bounded_and_clean(query in "[ -~\\t\\n\\x00-\\x1f]{0,80}", max in 1usize..40) {
        let clean = sanitize_query(&query, max);
        prop_assert!(clean.chars().count() <= max);
        prop_assert!(!clean.chars().any(char::is_control));
        prop_assert!(!clean.contains("  "));
        prop_assert!(!clean.starts_with(' '));
    }
}
