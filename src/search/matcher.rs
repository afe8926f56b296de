// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy matching of one query against a whole corpus.
//!
//! Every document is scored against every configured key; a document's
//! score is its best field score. Hits at or below the relevance threshold
//! are ranked ascending by score, ties broken by corpus order so the output
//! is deterministic. This is the only place matching happens: the worker
//! thread and the inline fallback both call `run_search`.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fuzzy::match_score;
use crate::types::{SearchDocument, SearchOptions};
use crate::utils::{field_values, fold};

/// A ranked match: which document, and how well it matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub score: f64,
}

/// Query folded and split into chars once, up front.
struct PreparedQuery<'a> {
    chars: Vec<char>,
    options: &'a SearchOptions,
}

impl<'a> PreparedQuery<'a> {
    fn new(query: &str, options: &'a SearchOptions) -> Self {
        let folded = fold(query.trim(), options.case_sensitive, options.ignore_diacritics);
        Self {
            chars: folded.chars().collect(),
            options,
        }
    }

    fn score(&self, doc: &SearchDocument) -> Option<f64> {
        let threshold = self.options.relevance_threshold;
        let mut best: Option<f64> = None;
        for key in &self.options.keys {
            for value in field_values(doc, key) {
                let text: Vec<char> =
                    fold(&value, self.options.case_sensitive, self.options.ignore_diacritics)
                        .chars()
                        .collect();
                if let Some(score) = match_score(&self.chars, &text, threshold) {
                    if best.map_or(true, |b| score < b) {
                        best = Some(score);
                    }
                    if score == 0.0 {
                        return best;
                    }
                }
            }
        }
        best
    }
}

/// Score and rank the corpus. Blank queries match nothing.
pub fn rank(corpus: &[SearchDocument], query: &str, options: &SearchOptions) -> Vec<Hit> {
    let prepared = PreparedQuery::new(query, options);
    if prepared.chars.is_empty() || options.keys.is_empty() {
        return Vec::new();
    }

    #[cfg(feature = "parallel")]
    let mut hits: Vec<Hit> = corpus
        .par_iter()
        .enumerate()
        .filter_map(|(index, doc)| prepared.score(doc).map(|score| Hit { index, score }))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let mut hits: Vec<Hit> = corpus
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| prepared.score(doc).map(|score| Hit { index, score }))
        .collect();

    hits.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.index.cmp(&b.index)));
    hits
}

/// Rank, drop hits that don't resolve to a document, unwrap, apply `limit`.
pub fn run_search(
    corpus: &[SearchDocument],
    query: &str,
    options: &SearchOptions,
) -> Vec<SearchDocument> {
    let limit = options.limit.unwrap_or(usize::MAX);
    rank(corpus, query, options)
        .into_iter()
        .filter_map(|hit| corpus.get(hit.index).cloned())
        .take(limit)
        .collect()
}
