// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Approximate substring matching with an early-exit optimization.
//!
//! This is Sellers' variant of Levenshtein: the pattern may start anywhere in
//! the text for free, so "shirt" matches "linen shirt" with zero edits. The
//! cost of a hit is the edit count normalised by pattern length, plus a small
//! penalty for how far into the text the match starts. Scores live in
//! `[0, 1]`, lower is better, and a perfect match at the start scores 0.
//!
//! The key insight for the early exit: if the text is shorter than the
//! pattern, at least `len(pattern) - len(text)` insertions are unavoidable.
//! If that alone exceeds the threshold, skip the O(nm) DP entirely.

/// How many characters into the text a match may drift before the location
/// penalty alone reaches 1.0.
pub const LOCATION_DISTANCE: f64 = 100.0;

/// Best score for `pattern` anywhere inside `text`, if it's within `threshold`.
///
/// Both inputs are char slices so callers can fold/normalise once and reuse.
/// Returns `None` for an empty pattern or when every alignment scores above
/// `threshold`.
pub fn match_score(pattern: &[char], text: &[char], threshold: f64) -> Option<f64> {
    let m = pattern.len();
    let n = text.len();
    if m == 0 {
        return None;
    }
    if pattern == text {
        return Some(0.0);
    }

    // Early-exit: a text shorter than the pattern forces this many edits
    if n < m && (m - n) as f64 / m as f64 > threshold {
        return None;
    }

    // prev[j] = edits to align pattern[..i] ending at text[..j]; row 0 is free
    let mut prev: Vec<usize> = vec![0; n + 1];
    let mut curr: Vec<usize> = vec![0; n + 1];
    for (i, pc) in pattern.iter().enumerate() {
        curr[0] = i + 1;
        let mut min_row = curr[0];
        for (j, tc) in text.iter().enumerate() {
            let cost = usize::from(pc != tc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            min_row = min_row.min(curr[j + 1]);
        }

        // Early-exit: edits never decrease going down the table
        if min_row as f64 / m as f64 > threshold {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let mut best: Option<f64> = None;
    for (end, &errors) in prev.iter().enumerate() {
        let start = end.saturating_sub(m);
        let score = (errors as f64 / m as f64 + start as f64 / LOCATION_DISTANCE).min(1.0);
        if score <= threshold && best.map_or(true, |b| score < b) {
            best = Some(score);
        }
    }
    best
}

/// Convenience wrapper over `match_score` for `&str` inputs.
pub fn match_str(pattern: &str, text: &str, threshold: f64) -> Option<f64> {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_score(&pattern, &text, threshold)
}
