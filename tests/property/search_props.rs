//! Search invariants over random corpora and queries.

use proptest::prelude::*;
use serde_json::json;
use storefront::fuzzy::{match_str, LOCATION_DISTANCE};
use storefront::search::{rank, run_search};
use storefront::{CorpusSource, ExecutionMode, SearchDocument, SearchEngine, SearchOptions, SearchOutcome};

use super::common::make_search_doc;

// ============================================================================
// STRATEGIES
// ============================================================================

fn word_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").unwrap()
}

fn title_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..4).prop_map(|words| words.join(" "))
}

fn corpus_strategy() -> impl Strategy<Value = Vec<SearchDocument>> {
    prop::collection::vec(
        (title_strategy(), prop::collection::vec(word_strategy(), 0..3)),
        1..12,
    )
    .prop_map(|docs| {
        docs.into_iter()
            .map(|(title, tags)| make_search_doc(json!({ "title": title, "tags": tags })))
            .collect()
    })
}

fn options_strategy() -> impl Strategy<Value = SearchOptions> {
    (0.0f64..=1.0, prop::option::of(1usize..6), any::<bool>()).prop_map(|(t, limit, tags)| {
        let keys = if tags { vec!["title", "tags"] } else { vec!["title"] };
        let mut options = SearchOptions::new(t, keys);
        options.limit = limit;
        options
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_results_are_corpus_members(corpus in corpus_strategy(),
                                       query in word_strategy(),
                                       options in options_strategy()) {
        for doc in run_search(&corpus, &query, &options) {
            prop_assert!(corpus.contains(&doc));
        }
    }

    #[test]
    fn prop_results_respect_limit(corpus in corpus_strategy(),
                                  query in word_strategy(),
                                  options in options_strategy()) {
        let results = run_search(&corpus, &query, &options);
        if let Some(limit) = options.limit {
            prop_assert!(results.len() <= limit);
        }
        prop_assert!(results.len() <= corpus.len());
    }

    #[test]
    fn prop_hits_are_sorted_and_within_threshold(corpus in corpus_strategy(),
                                                 query in word_strategy(),
                                                 options in options_strategy()) {
        let hits = rank(&corpus, &query, &options);
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score < pair[1].score
                || (pair[0].score == pair[1].score && pair[0].index < pair[1].index));
        }
        for hit in &hits {
            prop_assert!(hit.index < corpus.len());
            prop_assert!(hit.score >= 0.0 && hit.score <= options.relevance_threshold);
        }
    }

    #[test]
    fn prop_ranking_is_deterministic(corpus in corpus_strategy(),
                                     query in word_strategy(),
                                     options in options_strategy()) {
        prop_assert_eq!(rank(&corpus, &query, &options), rank(&corpus, &query, &options));
    }

    #[test]
    fn prop_exact_substring_costs_only_location(prefix in "[a-z ]{0,20}",
                                                needle in word_strategy(),
                                                suffix in "[a-z ]{0,10}") {
        let text = format!("{prefix}{needle}{suffix}");
        let score = match_str(&needle, &text, 1.0);
        prop_assert!(score.is_some());
        prop_assert!(score.unwrap() <= prefix.chars().count() as f64 / LOCATION_DISTANCE + 1e-9);
    }

    #[test]
    fn prop_ready_engine_never_loads(corpus in corpus_strategy(), query in word_strategy()) {
        let engine = SearchEngine::builder()
            .source(CorpusSource::Literal(corpus))
            .execution(ExecutionMode::Inline)
            .build();
        let is_loading = matches!(engine.search(&query, None), SearchOutcome::Loading { .. });
        prop_assert!(!is_loading);
    }
}
