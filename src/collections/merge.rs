// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! What happens when a collection arrives whose handle we already hold.
//!
//! **Invariant**: after any of these, no two products in a collection share
//! an `id`. Existing products keep their position; only genuinely new ids
//! are appended.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Collection, Product};

/// Conflict policy for `add_collections`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Combine into the existing entry; new fields win, products union by id.
    #[default]
    Merge,
    /// Overwrite the existing entry wholesale.
    Replace,
}

/// Append products whose ids aren't present yet. Returns how many were added.
pub fn append_unique(products: &mut Vec<Product>, incoming: Vec<Product>) -> usize {
    let mut seen: HashSet<String> = products.iter().map(|p| p.id.clone()).collect();
    let before = products.len();
    for product in incoming {
        if seen.insert(product.id.clone()) {
            products.push(product);
        }
    }
    products.len() - before
}

/// Fold `incoming` into `existing`.
///
/// Descriptive fields from `incoming` override. Pagination metadata is taken
/// from `incoming` only when it carries some, so merging a bare collection
/// doesn't forget where paging left off.
pub fn merge_into(existing: &mut Collection, incoming: Collection) {
    let Collection {
        handle: _,
        products,
        product_lists,
        fields,
    } = incoming;

    existing.fields.extend(fields);
    append_unique(&mut existing.products, products);
    if product_lists.is_some() {
        existing.product_lists = product_lists;
    }
}

/// Apply `incoming` to `existing` under `method`.
pub fn apply(existing: &mut Collection, incoming: Collection, method: MergeMethod) {
    match method {
        MergeMethod::Merge => merge_into(existing, incoming),
        MergeMethod::Replace => *existing = incoming,
    }
}
