// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy search: typo tolerance via edit distance.
//!
//! One scorer, used for every field of every document: a bounded
//! approximate-substring Levenshtein that returns a relevance score in
//! `[0, 1]` (lower is better).

mod levenshtein;

pub use levenshtein::*;
